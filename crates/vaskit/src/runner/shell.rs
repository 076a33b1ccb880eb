//! Runner that executes command lines with `sh -c`.

use std::process::Command;

use crate::command::CommandLine;
use crate::error::Result;
use crate::runner::Runner;
use crate::types::CommandResult;

/// Runs commands through the system shell.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
}

impl ShellRunner {
    /// Use `/bin/sh`.
    pub fn new() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
        }
    }

    /// Use a different POSIX shell.
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner for ShellRunner {
    fn run(&self, command: &CommandLine) -> Result<CommandResult> {
        log::debug!("running: {}", command.redacted());

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command.to_shell_string())
            .output()?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        // Killed by a signal
        let exit_code = output.status.code().unwrap_or(-1);
        log::trace!("exit {exit_code}, {} bytes of output", text.len());

        Ok(CommandResult::new(exit_code, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merges_stdout_then_stderr() {
        let runner = ShellRunner::new();
        let cmd = CommandLine::new("echo").raw("out; echo err >&2; exit 3");
        let result = runner.run(&cmd).unwrap();
        assert_eq!(result.exit_code, 3);
        assert_eq!(result.output, "out\nerr\n");
    }

    #[test]
    fn test_quoted_values_reach_the_process_intact() {
        let runner = ShellRunner::new();
        let cmd = CommandLine::new("printf").value("%s").value("it's $HOME");
        let result = runner.run(&cmd).unwrap();
        assert!(result.success());
        assert_eq!(result.output, "it's $HOME");
    }

    #[test]
    fn test_program_path_with_spaces() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin_dir = dir.path().join("my tools");
        std::fs::create_dir(&bin_dir).unwrap();
        let program = bin_dir.join("vastool");
        std::fs::write(&program, "#!/bin/sh\necho ran\n").unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let result = ShellRunner::new()
            .run(&CommandLine::new(&program).flag("-v"))
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output, "ran\n");
    }

    #[test]
    fn test_program_path_is_not_interpreted() {
        let result = ShellRunner::new()
            .run(&CommandLine::new("/nonexistent/$(echo injected)"))
            .unwrap();
        assert_eq!(result.exit_code, 127);
        assert!(!result.output.contains("/nonexistent/injected"));
    }

    #[test]
    fn test_missing_shell_is_an_io_error() {
        let runner = ShellRunner::with_shell("/nonexistent/shell");
        let err = runner.run(&CommandLine::new("true")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
