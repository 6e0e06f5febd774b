pub mod commands;
pub mod config;
pub mod dispatch;
pub mod llm;
pub mod logging;
pub mod runtime;
pub mod styles;
pub mod tasks;
pub mod telegram;
pub mod transport;

pub use chatbridge_core::error;
pub use chatbridge_core::text;
pub use chatbridge_storage::db;
