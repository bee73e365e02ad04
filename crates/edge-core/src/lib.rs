pub mod config;
pub mod types;

pub use config::EdgeConfig;
pub use types::*;
