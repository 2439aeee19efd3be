//! Brand-impersonation threat hunting.
//!
//! A language model writes search dorks for a brand, a search API runs them,
//! and a second model pass keeps the hits that look like brand abuse.

pub mod cli;
pub mod config;
pub mod core;
pub mod dork;
pub mod pipeline;
pub mod providers;
