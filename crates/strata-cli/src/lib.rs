//! Strata CLI library.
//!
//! Configuration, argument parsing, the parallel scan driver and output
//! formatting behind the `strata` binary.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;

pub use cli::{Cli, Command};
pub use config::Config;
pub use error::{CliError, Result};
pub use output::Formatter;
pub use scanner::{ScanDriver, SourceResult};
