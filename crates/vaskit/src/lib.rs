//! # vaskit
//!
//! Drive the QAS `vastool` family of binaries and classify what they print.
//!
//! This crate provides functionality for:
//! - Joining and unjoining Active Directory domains idempotently
//! - Running preflight checks before a join
//! - Classifying `vastool status -c` health checks
//! - Listing mapped users, access control files and logon policy
//! - Reading local accounts from flat files or macOS directory services
//!
//! Every operation returns an [`Outcome`]: an optional error, whether the
//! host changed, and whatever was gathered along the way.
//!
//! ## Example
//!
//! ```no_run
//! use vaskit::{Client, JoinRequest};
//!
//! let client = Client::new();
//! let request = JoinRequest {
//!     domain: "corp.example.com".into(),
//!     username: "joiner".into(),
//!     password: "secret".into(),
//!     ..JoinRequest::default()
//! };
//!
//! let outcome = client.reconcile("joined", &request);
//! if let Some(err) = &outcome.error {
//!     eprintln!("join failed: {err}");
//! }
//! for step in &outcome.payload.steps {
//!     println!("{} ... {}", step.message, step.result);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod access;
pub mod command;
pub mod error;
pub mod health;
pub mod join;
pub mod local;
pub mod mapped;
pub mod paths;
pub mod preflight;
pub mod probe;
pub mod records;
pub mod runner;
pub mod status;
pub mod types;

pub use access::{AccessControl, LogonPolicy};
pub use command::CommandLine;
pub use error::{Error, ErrorKind, Result};
pub use health::HealthReport;
pub use join::{Action, DesiredState, JoinReport, JoinRequest};
pub use local::AccountSource;
pub use paths::Paths;
pub use preflight::{PreflightReport, PreflightRequest};
pub use status::JoinState;
pub use types::{
    CommandResult, IssueRecord, MappedUser, Outcome, Severity, StepRecord, StepResult, Version,
};

use idmap::{GroupEntry, GroupFilter, PasswdEntry};
use runner::{Runner, ShellRunner};
use serde::Serialize;

/// vastool version and current domain.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JoinStatus {
    /// vastool version
    pub version: Version,
    /// Joined domain, `None` when not joined
    pub domain: Option<String>,
}

/// High-level client for vastool operations.
///
/// The client wraps a runner, the binary locations and the local account
/// source. Nothing is cached: every call re-reads the host.
pub struct Client {
    runner: Box<dyn Runner>,
    paths: Paths,
    accounts: AccountSource,
}

impl Client {
    /// Create a client that runs commands through `/bin/sh` with default paths.
    pub fn new() -> Self {
        Self::with_runner(Box::new(ShellRunner::new()))
    }

    /// Create a client with a custom runner (useful for testing).
    pub fn with_runner(runner: Box<dyn Runner>) -> Self {
        Self {
            runner,
            paths: Paths::default(),
            accounts: AccountSource::native(),
        }
    }

    /// Use different binary locations.
    #[must_use]
    pub fn paths(mut self, paths: Paths) -> Self {
        self.paths = paths;
        self
    }

    /// Read local accounts from a different source.
    #[must_use]
    pub fn accounts(mut self, accounts: AccountSource) -> Self {
        self.accounts = accounts;
        self
    }

    /// Binary locations in use.
    pub fn binary_paths(&self) -> &Paths {
        &self.paths
    }

    // =========================================================================
    // Join state
    // =========================================================================

    /// Probe vastool and report the current domain.
    pub fn join_status(&self) -> Outcome<JoinStatus> {
        let mut report = JoinStatus::default();
        let gather = |report: &mut JoinStatus| -> Result<()> {
            report.version = probe::probe(self.runner.as_ref(), &self.paths.vastool, "-v")?;
            report.domain = status::query(self.runner.as_ref(), &self.paths.vastool)?
                .domain()
                .map(str::to_string);
            Ok(())
        };

        match gather(&mut report) {
            Ok(()) => Outcome::unchanged(report),
            Err(err) => Outcome::failed(err, report),
        }
    }

    /// Bring the host to `state` (`"joined"` or `"unjoined"`).
    pub fn reconcile(&self, state: &str, request: &JoinRequest) -> Outcome<JoinReport> {
        join::reconcile(self.runner.as_ref(), &self.paths.vastool, state, request)
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Run `vastool status -c`.
    pub fn health(&self) -> Outcome<HealthReport> {
        health::run(self.runner.as_ref(), &self.paths.vastool)
    }

    /// Run preflight checks.
    pub fn preflight(&self, request: &PreflightRequest) -> Outcome<PreflightReport> {
        preflight::run(self.runner.as_ref(), &self.paths.preflight, request)
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Local users mapped to directory accounts.
    pub fn mapped_users(&self) -> Outcome<Vec<MappedUser>> {
        mapped::run(
            self.runner.as_ref(),
            &self.paths.vastool,
            &self.paths.asdcom,
            &self.accounts,
        )
    }

    /// Allow/deny files and their entries.
    pub fn access_control(&self) -> Outcome<AccessControl> {
        access::access_control(self.runner.as_ref(), &self.paths.vastool)
    }

    /// Users allowed to log on to this host.
    pub fn logon_policy(&self) -> Outcome<LogonPolicy> {
        access::logon_policy(self.runner.as_ref(), &self.paths.vastool)
    }

    // =========================================================================
    // Local accounts
    // =========================================================================

    /// All local users.
    pub fn local_users(&self) -> Outcome<Vec<PasswdEntry>> {
        match local::users(self.runner.as_ref(), &self.accounts) {
            Ok(users) => Outcome::unchanged(users),
            Err(err) => Outcome::failed_empty(err),
        }
    }

    /// Local users that clash with a planned `user_name`/`uid_number` account.
    pub fn local_user_conflicts(&self, user_name: &str, uid_number: &str) -> Outcome<Vec<PasswdEntry>> {
        self.local_users().map(|users| {
            idmap::local::user_conflicts(&users, user_name, uid_number)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    /// Local groups passing `filter`.
    pub fn local_groups(&self, filter: &GroupFilter) -> Outcome<Vec<GroupEntry>> {
        match local::groups(self.runner.as_ref(), &self.accounts) {
            Ok(groups) => Outcome::unchanged(filter.apply(groups)),
            Err(err) => Outcome::failed_empty(err),
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}
