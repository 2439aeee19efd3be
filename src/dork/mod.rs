//! Dork query generation: prompts, output parsing and validation.

pub mod generator;
pub mod parser;
pub mod prompts;
pub mod validator;
