pub mod chat;
pub mod provider;
pub mod providers;

pub use chat::ChatClient;
pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::create_provider;
