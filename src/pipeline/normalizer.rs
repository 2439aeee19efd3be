use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::time::now_utc;
use crate::core::types::{RawSearchPayload, SearchResultRecord};

/// Flattens payloads into records: payload order first, then organic order.
/// Payloads that are not mappings or lack `organic` contribute nothing.
pub fn normalize_results(payloads: &[RawSearchPayload]) -> Vec<SearchResultRecord> {
    normalize_at(payloads, now_utc())
}

pub fn normalize_at(payloads: &[RawSearchPayload], captured: DateTime<Utc>) -> Vec<SearchResultRecord> {
    payloads
        .iter()
        .filter_map(RawSearchPayload::organic)
        .flatten()
        .map(|entry| to_record(entry, captured))
        .collect()
}

fn to_record(entry: &Value, captured: DateTime<Utc>) -> SearchResultRecord {
    let text = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    SearchResultRecord {
        title: text("title"),
        link: text("link"),
        snippet: text("snippet"),
        position: entry.get("position").and_then(Value::as_i64).unwrap_or(0),
        timestamp: captured,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap()
    }

    #[test]
    fn order_preserved_and_missing_organic_skipped() {
        let payloads = vec![
            RawSearchPayload(json!({"organic": [{"title": "A", "link": "a"}]})),
            RawSearchPayload(json!({})),
            RawSearchPayload(json!({"organic": [{"title": "B", "link": "b"}]})),
        ];
        let records = normalize_at(&payloads, at());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "A");
        assert_eq!(records[0].link, "a");
        assert_eq!(records[1].title, "B");
    }

    #[test]
    fn missing_fields_default() {
        let payloads = vec![RawSearchPayload(json!({"organic": [{"link": "https://x.glitch.me"}]}))];
        let records = normalize_at(&payloads, at());
        assert_eq!(
            records[0],
            SearchResultRecord {
                title: String::new(),
                link: "https://x.glitch.me".into(),
                snippet: String::new(),
                position: 0,
                timestamp: at(),
            }
        );
    }

    #[test]
    fn non_mapping_payloads_are_ignored() {
        let payloads = vec![
            RawSearchPayload(json!([1, 2, 3])),
            RawSearchPayload(json!({"organic": "oops"})),
            RawSearchPayload(json!({"organic": [{"title": "kept", "position": 7}]})),
        ];
        let records = normalize_at(&payloads, at());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].position, 7);
    }

    #[test]
    fn duplicate_links_are_kept() {
        let hit = json!({"organic": [{"title": "Acme login", "link": "https://same"}]});
        let payloads = vec![RawSearchPayload(hit.clone()), RawSearchPayload(hit)];
        assert_eq!(normalize_at(&payloads, at()).len(), 2);
    }
}
