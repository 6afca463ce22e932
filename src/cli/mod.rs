//! Terminal shell over [`Tracker`](crate::Tracker), used for development and scripting.

mod commands;
mod context;
pub mod output;
mod shell;

use thiserror::Error;

use crate::errors::LedgerError;

pub use context::{CliMode, ShellContext};
pub use shell::{run_cli, SCRIPT_ENV};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single command failed; the shell reports it and keeps running.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}
