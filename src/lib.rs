pub mod core;
pub mod utils;

// Re-export everything from core for ergonomic library use
// Users can write `composor::history` instead of `composor::core::history`
pub use core::*;
pub use utils::*;
