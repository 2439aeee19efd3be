use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub fn stable_run_id(brand: &str, model: &str, started_at: &DateTime<Utc>) -> String {
    let mut buf = String::new();
    buf.push_str(brand);
    buf.push('|');
    buf.push_str(model);
    buf.push('|');
    buf.push_str(&started_at.to_rfc3339());
    format!("run_{}", &sha256_hex(buf.as_bytes())[..16])
}
