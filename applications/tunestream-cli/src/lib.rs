//! TuneStream CLI Library
//!
//! Console driver for the playback core: command parsing, a media backend
//! that only logs, and the interactive session tying them to a controller.
//!
//! This library exposes the components for testing purposes.

pub mod commands;
pub mod config;
pub mod console_backend;
pub mod error;
pub mod session;

// Re-export commonly used types for convenience
pub use commands::{parse, Command};
pub use config::CliConfig;
pub use console_backend::{BackendLog, ConsoleBackend};
pub use error::{CliError, Result};
pub use session::{Reply, Session};
