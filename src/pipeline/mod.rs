//! Hunt stages and the driver that sequences them.

pub mod classifier;
pub mod driver;
pub mod normalizer;
pub mod reporter;
pub mod searcher;
