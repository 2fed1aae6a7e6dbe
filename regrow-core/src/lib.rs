//! regrow core library.
//!
//! Maps device entries (mount points or `/dev` paths) onto `(disk, partition)` pairs and grows
//! each partition with an external resize tool (`growpart` or `gpart`). Everything that
//! touches the host goes through `regrow-hal`.

pub mod backend;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod module;
pub mod orchestrator;
pub mod platform;
pub mod report;
pub mod resolver;
pub mod selector;

pub use errors::{ResizeError, ResolveError, SelectError};
pub use report::{ResizeAction, ResizeOutcome, ResizeReport, ResolvedDevice};
