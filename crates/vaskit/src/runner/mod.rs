//! Process execution abstraction.
//!
//! The [`Runner`] trait is the only place a process is spawned, allowing for
//! different implementations (real shell, scripted output for testing).

pub mod shell;

use crate::command::CommandLine;
use crate::error::Result;
use crate::types::CommandResult;

pub use shell::ShellRunner;

/// Executes command lines and captures what they print.
pub trait Runner: Send + Sync {
    /// Run a command to completion.
    ///
    /// A non-zero exit is not an error: it is reported in the result. Only a
    /// failure to start the process is.
    fn run(&self, command: &CommandLine) -> Result<CommandResult>;
}
