pub mod config;
pub mod mode;
pub mod persona;

pub use config::Config;
pub use mode::SummaryMode;
pub use persona::{system_prompt, PERSONA_PRESETS};
