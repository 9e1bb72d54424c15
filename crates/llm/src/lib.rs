pub mod extract;
pub mod oracle;
pub mod provider;
pub mod providers;

pub use oracle::Oracle;
pub use provider::{LlmError, LlmProvider, Message, Role};
