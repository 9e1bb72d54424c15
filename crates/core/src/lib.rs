pub mod accept;
pub mod config;
pub mod error;
pub mod rule;

pub use config::Config;
pub use error::CoreError;
pub use rule::{Rule, StringPair};
