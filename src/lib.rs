//! Producer/consumer handshake
//!
//! A consumer thread blocks on a condition variable until a producer thread
//! sets a mutex-guarded readiness flag and notifies it. This library holds the
//! signal primitive, the two role routines, the coordinator that runs them,
//! plus configuration, command-line parsing and logging for the binary.

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod logging;
pub mod roles;
pub mod signal;
pub mod transcript;

pub use cli::parse_args;
pub use config::{parse_config, Config, StartOrder};
pub use coordinator::{run, Role, RunSummary};
pub use logging::{log, log_with_role, set_log_file};
pub use signal::{Readiness, Signal};
pub use transcript::{MemoryTranscript, StdoutTranscript, Transcript};

/// Name of the program, used in usage and version output
pub const PROGRAM_NAME: &str = "handshake";

/// Current version of the program (from Cargo.toml)
pub const PROGRAM_VERSION: &str = env!("CARGO_PKG_VERSION");
