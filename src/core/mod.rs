// Public modules
pub mod artifact;
pub mod build;
pub mod compose;
pub mod config;
pub mod deploy;
pub mod docker;
pub mod error;
pub mod git;
pub mod history;
pub mod local_files;
pub mod report;
pub mod reporter;

// Re-export common types for convenience
pub use error::{Error, Result};
pub use history::{Selection, SelectionOutcome, Snapshot, SnapshotStatus};
pub use report::{AppImage, DeploymentReport, RollbackNote};
pub use reporter::{Reporter, StderrReporter};
