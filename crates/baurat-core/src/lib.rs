pub mod agent;
pub mod config;
pub mod pipeline;
pub mod retrieval;
pub mod types;

pub use types::*;
