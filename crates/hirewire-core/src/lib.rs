//! `hirewire-core` — shared domain types for the interview bot.
//!
//! Everything the other crates have in common lives here: the
//! [`Interview`](types::Interview) record, configuration loading,
//! date/time validation, the `key=value` update tokenizer, the grouped
//! list renderer, and the outbound-message type passed from the job
//! runner to the Discord delivery task.

pub mod config;
pub mod error;
pub mod format;
pub mod outbound;
pub mod types;
pub mod update;
pub mod validate;

pub use config::HirewireConfig;
pub use error::{HirewireError, Result};
