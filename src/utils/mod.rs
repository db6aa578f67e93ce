//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - Command execution with error handling
//! - `envkey` - Environment variable key normalization
//! - `timestamp` - Invocation timestamps

pub mod command;
pub(crate) mod envkey;
pub mod timestamp;
