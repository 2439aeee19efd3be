//! Shared types, errors and helpers.

pub mod error;
pub mod hash;
pub mod time;
pub mod types;
