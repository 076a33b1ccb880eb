//! Host access control: the users.allow/users.deny files and the resulting
//! logon policy.

use serde::Serialize;
use std::path::{Path, PathBuf};

use idmap::PasswdEntry;
use idmap::local::content_lines;

use crate::command::CommandLine;
use crate::error::{Error, Result};
use crate::probe;
use crate::runner::Runner;
use crate::types::{Outcome, Version};

/// Allow file used when vastool reports none.
pub const DEFAULT_ALLOW_FILE: &str = "/etc/opt/quest/vas/users.allow";
/// Deny file used when vastool reports none.
pub const DEFAULT_DENY_FILE: &str = "/etc/opt/quest/vas/users.deny";

/// Configured allow/deny files and their entries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AccessControl {
    /// vastool version
    pub version: Version,
    /// Effective allow file
    pub users_allow_file: PathBuf,
    /// Effective deny file
    pub users_deny_file: PathBuf,
    /// Entries of the allow file
    pub users_allow: Vec<String>,
    /// Entries of the deny file
    pub users_deny: Vec<String>,
}

/// Users the host lets log on.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogonPolicy {
    /// vastool version
    pub version: Version,
    /// One passwd-style record per allowed user
    pub users_allowed: Vec<PasswdEntry>,
}

/// `vastool inspect <setting>`, trimmed.
pub fn inspect(runner: &dyn Runner, vastool: &Path, setting: &str) -> Result<String> {
    let cmd = CommandLine::new(vastool).flag("inspect").raw(setting);
    let result = runner.run(&cmd)?;
    if !result.success() {
        return Err(Error::CommandFailed(result.output));
    }
    Ok(result.output.trim().to_string())
}

/// Non-blank, non-comment lines of an access file.
///
/// A missing file is reported as a single entry rather than an error.
pub fn entries(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Ok(vec![format!("{} does not exist.", path.display())]);
    }
    let bytes = std::fs::read(path)?;
    Ok(content_lines(&String::from_utf8_lossy(&bytes))
        .map(str::to_string)
        .collect())
}

fn configured_file(runner: &dyn Runner, vastool: &Path, setting: &str, default: &str) -> Result<PathBuf> {
    let value = inspect(runner, vastool, setting)?;
    Ok(if value.is_empty() {
        PathBuf::from(default)
    } else {
        PathBuf::from(value)
    })
}

/// Read the allow and deny files vastool is configured with.
pub fn access_control(runner: &dyn Runner, vastool: &Path) -> Outcome<AccessControl> {
    let mut report = AccessControl::default();
    let gather = |report: &mut AccessControl| -> Result<()> {
        report.version = probe::probe(runner, vastool, "-v")?;
        report.users_allow_file =
            configured_file(runner, vastool, "vas_auth users-allow-file", DEFAULT_ALLOW_FILE)?;
        report.users_deny_file =
            configured_file(runner, vastool, "vas_auth users-deny-file", DEFAULT_DENY_FILE)?;
        report.users_allow = entries(&report.users_allow_file)?;
        report.users_deny = entries(&report.users_deny_file)?;
        Ok(())
    };

    match gather(&mut report) {
        Ok(()) => Outcome::unchanged(report),
        Err(err) => Outcome::failed(err, report),
    }
}

/// Parse `vastool list users-allowed` output, keeping 7-field records.
pub fn parse_users_allowed(raw: &str) -> Vec<PasswdEntry> {
    raw.lines()
        .map(str::trim)
        .filter_map(PasswdEntry::from_line)
        .collect()
}

/// `vastool list users-allowed`.
pub fn logon_policy(runner: &dyn Runner, vastool: &Path) -> Outcome<LogonPolicy> {
    let mut report = LogonPolicy::default();
    let gather = |report: &mut LogonPolicy| -> Result<()> {
        report.version = probe::probe(runner, vastool, "-v")?;
        let result = runner.run(&CommandLine::new(vastool).flag("list").flag("users-allowed"))?;
        if result.exit_code > 0 {
            return Err(Error::CommandFailed(result.output));
        }
        report.users_allowed = parse_users_allowed(&result.output);
        Ok(())
    };

    match gather(&mut report) {
        Ok(()) => Outcome::unchanged(report),
        Err(err) => Outcome::failed(err, report),
    }
}
