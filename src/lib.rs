// Bank Statement Assistant - Core Library
// Exposes the pipeline modules for use in the CLI, the API server, and tests

pub mod chat;
pub mod config;
pub mod gateway;
pub mod ledger;
pub mod prompt;

// Re-export commonly used types
pub use chat::{ChatExchange, ChatSession};
pub use config::Config;
pub use gateway::{answer_from_response, Gateway, ModelInfo, ModelPricing};
pub use ledger::{Ledger, Record};
pub use prompt::{build_prompt, FORMAT_DIRECTIVE, SYSTEM_PERSONA};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
