use crate::cli::{output, CommandError};
use crate::config::Config;
use crate::core::{Mutation, Tracker};
use crate::errors::LedgerResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// State shared by every command in one shell session.
pub struct ShellContext {
    pub mode: CliMode,
    pub tracker: Tracker,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode, config: &Config) -> LedgerResult<Self> {
        let tracker = config.open_tracker()?;
        for warning in &tracker.load_report().warnings {
            output::warning(warning);
        }
        Ok(Self {
            mode,
            tracker,
            running: true,
        })
    }

    pub fn prompt(&self) -> String {
        format!("fintrack [{}]> ", self.tracker.filter_mode())
    }

    /// Tells the user when a change only lives in memory.
    pub fn warn_if_volatile<T>(&self, mutation: &Mutation<T>) {
        if let Some(err) = &mutation.persist_error {
            output::warning(format!(
                "change applied but not saved ({err}); it may be lost on restart"
            ));
        }
    }

    pub fn report_error(&self, err: &CommandError) {
        output::error(err);
    }
}
