//! Join/unjoin reconciliation.
//!
//! The current state is read fresh from `vastool status -q` on every call and
//! compared with the requested one:
//!
//! | current            | requested  | action                 |
//! |--------------------|------------|------------------------|
//! | not joined         | `joined`   | join                   |
//! | joined to target   | `joined`   | nothing                |
//! | joined elsewhere   | `joined`   | `DomainConflict`       |
//! | joined             | `unjoined` | unjoin                 |
//! | not joined         | `unjoined` | nothing                |
//!
//! Join and unjoin output is classified line by line into [`StepRecord`]s.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::command::CommandLine;
use crate::error::{Error, Result};
use crate::probe;
use crate::runner::Runner;
use crate::status::{self, JoinState};
use crate::types::{Outcome, StepRecord, StepResult, Version, failure_summary};

static STEP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(.+)\s\.\.\.\s(.+)").expect("valid regex"));

static ERROR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^(error): (.*)$").expect("valid regex"));

/// Requested membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// Host should be joined to the requested domain
    Joined,
    /// Host should not be joined to any domain
    Unjoined,
}

impl FromStr for DesiredState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "joined" => Ok(Self::Joined),
            "unjoined" => Ok(Self::Unjoined),
            other => Err(Error::InvalidState(other.to_string())),
        }
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Joined => "joined",
            Self::Unjoined => "unjoined",
        })
    }
}

/// What reconciliation decided to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Run `vastool join`
    Join,
    /// Run `vastool unjoin`
    Unjoin,
    /// Already in the requested state
    #[default]
    Nothing,
}

/// Parameters for join and unjoin.
///
/// Unjoin uses only the credentials, account name and extra arguments.
#[derive(Debug, Clone, Default)]
pub struct JoinRequest {
    /// Target domain
    pub domain: String,
    /// Account allowed to join hosts
    pub username: String,
    /// Its password
    pub password: String,
    /// Computer account name (`-n`)
    pub account_name: String,
    /// Container for the computer account (`-c`)
    pub container: String,
    /// Domain controllers to use instead of discovery
    pub servers: Vec<String>,
    /// Shell fragment passed to vastool unchanged
    pub extra_args: String,
}

/// Everything a reconciliation learned, even when it failed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JoinReport {
    /// vastool version
    pub version: Version,
    /// State before any action
    pub previous: JoinState,
    /// Action taken
    pub action: Action,
    /// Classified vastool output
    pub steps: Vec<StepRecord>,
}

/// Decide the action for a state pair.
pub fn plan(current: &JoinState, desired: DesiredState, domain: &str) -> Result<Action> {
    match (desired, current) {
        (DesiredState::Joined, JoinState::NotJoined) => Ok(Action::Join),
        (DesiredState::Joined, JoinState::Joined(joined)) if joined == domain => Ok(Action::Nothing),
        (DesiredState::Joined, JoinState::Joined(joined)) => Err(Error::DomainConflict {
            requested: domain.to_string(),
            current: joined.clone(),
        }),
        (DesiredState::Unjoined, JoinState::Joined(_)) => Ok(Action::Unjoin),
        (DesiredState::Unjoined, JoinState::NotJoined) => Ok(Action::Nothing),
    }
}

/// `vastool -u U -w P join -f [-n N] [-c C] [extra] DOMAIN [SERVER...]`
pub fn join_command(vastool: &Path, request: &JoinRequest) -> CommandLine {
    CommandLine::new(vastool)
        .option("-u", request.username.as_str())
        .secret("-w", request.password.as_str())
        .flag("join")
        .flag("-f")
        .option_if("-n", &request.account_name)
        .option_if("-c", &request.container)
        .raw(&request.extra_args)
        .value(request.domain.as_str())
        .values(request.servers.iter().map(String::as_str))
}

/// `vastool -u U -w P unjoin -f [-n N] [extra]`
pub fn unjoin_command(vastool: &Path, request: &JoinRequest) -> CommandLine {
    CommandLine::new(vastool)
        .option("-u", request.username.as_str())
        .secret("-w", request.password.as_str())
        .flag("unjoin")
        .flag("-f")
        .option_if("-n", &request.account_name)
        .raw(&request.extra_args)
}

/// First letter upper case, the rest lower case.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}

/// Classify join/unjoin output.
///
/// `message ... result` lines come first, in order, followed by `ERROR:` lines.
pub fn classify_steps(raw: &str) -> Vec<StepRecord> {
    let steps = STEP_LINE.captures_iter(raw).map(|caps| {
        StepRecord::new(&caps[1], StepResult::from_label(&capitalize(&caps[2])))
    });
    let errors = ERROR_LINE.captures_iter(raw).map(|caps| {
        StepRecord::new(&caps[2], StepResult::from_label(&capitalize(&caps[1])))
    });
    steps.chain(errors).collect()
}

/// Bring the host to `desired`.
///
/// The version is probed first on every path, so it is reported even when
/// nothing needs doing.
pub fn reconcile(
    runner: &dyn Runner,
    vastool: &Path,
    desired: &str,
    request: &JoinRequest,
) -> Outcome<JoinReport> {
    let desired = match desired.parse::<DesiredState>() {
        Ok(desired) => desired,
        Err(err) => return Outcome::failed_empty(err),
    };

    let mut report = JoinReport::default();
    match probe::probe(runner, vastool, "-v") {
        Ok(version) => report.version = version,
        Err(err) => return Outcome::failed(err, report),
    }

    match status::query(runner, vastool) {
        Ok(state) => report.previous = state,
        Err(err) => return Outcome::failed(err, report),
    }

    let action = match plan(&report.previous, desired, &request.domain) {
        Ok(action) => action,
        Err(err) => return Outcome::failed(err, report),
    };
    report.action = action;
    log::info!(
        "{desired} requested, currently {:?}: {action:?}",
        report.previous
    );

    let command = match action {
        Action::Nothing => return Outcome::unchanged(report),
        Action::Join => join_command(vastool, request),
        Action::Unjoin => unjoin_command(vastool, request),
    };

    let result = match runner.run(&command) {
        Ok(result) => result,
        Err(err) => return Outcome::failed(err, report),
    };
    report.steps = classify_steps(&result.output);
    if report.steps.is_empty() && !result.success() {
        return Outcome::failed(Error::ParseFailure(result.output), report);
    }

    match failure_summary(&report.steps) {
        Some(summary) => Outcome::failed(Error::StepFailure(summary), report),
        None => Outcome::changed(report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::probe::fixtures::binary;
    use crate::runner::scripted::ScriptedRunner;

    const JOIN_OK: &str = "\
Checking time synchronization ... SUCCESS
Joining computer to the domain ... done
Configuring the system ... SUCCESS
";

    const JOIN_FAILED: &str = "\
Checking time synchronization ... SUCCESS
Joining computer to the domain ... FAILED
ERROR: Invalid credentials
";

    fn request(domain: &str) -> JoinRequest {
        JoinRequest {
            domain: domain.into(),
            username: "admin".into(),
            password: "pa'ss".into(),
            ..JoinRequest::default()
        }
    }

    fn runner(status: &str, action_output: &str) -> ScriptedRunner {
        ScriptedRunner::new()
            .reply("vastool' -v", 0, "vastool: QAS 5.1.5.23034")
            .reply("status -q", 0, status)
            .reply(" join -f", 0, action_output)
            .reply(" unjoin -f", 0, action_output)
    }

    #[test]
    fn test_desired_state() {
        assert_eq!("joined".parse::<DesiredState>().unwrap(), DesiredState::Joined);
        let err = "present".parse::<DesiredState>().unwrap_err();
        assert_eq!(err.to_string(), "Unexpected state requested: present");
    }

    #[test]
    fn test_plan_table() {
        let corp = JoinState::Joined("CORP.EXAMPLE".into());
        let other = JoinState::Joined("OTHER.EXAMPLE".into());
        let none = JoinState::NotJoined;

        assert_eq!(plan(&none, DesiredState::Joined, "CORP.EXAMPLE").unwrap(), Action::Join);
        assert_eq!(plan(&corp, DesiredState::Joined, "CORP.EXAMPLE").unwrap(), Action::Nothing);
        assert_eq!(
            plan(&other, DesiredState::Joined, "CORP.EXAMPLE").unwrap_err().kind(),
            ErrorKind::DomainConflict
        );
        assert_eq!(plan(&other, DesiredState::Unjoined, "").unwrap(), Action::Unjoin);
        assert_eq!(plan(&none, DesiredState::Unjoined, "").unwrap(), Action::Nothing);
    }

    #[test]
    fn test_join_command() {
        let req = JoinRequest {
            account_name: "host01".into(),
            container: "OU=Unix Hosts,DC=corp".into(),
            servers: vec!["dc1".into(), "dc2".into()],
            extra_args: "--skip-config".into(),
            ..request("CORP.EXAMPLE")
        };
        let cmd = join_command(Path::new("/opt/quest/bin/vastool"), &req);
        assert_eq!(
            cmd.to_shell_string(),
            "'/opt/quest/bin/vastool' -u 'admin' -w 'pa'\"'\"'ss' join -f -n 'host01' \
             -c 'OU=Unix Hosts,DC=corp' --skip-config 'CORP.EXAMPLE' 'dc1' 'dc2'"
        );
    }

    #[test]
    fn test_password_survives_the_shell() {
        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(format!("printf %s {}", crate::command::quote("pa'ss")))
            .output()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "pa'ss");
    }

    #[test]
    fn test_unjoin_command_omits_domain() {
        let req = JoinRequest {
            container: "OU=ignored".into(),
            servers: vec!["dc1".into()],
            ..request("CORP.EXAMPLE")
        };
        let cmd = unjoin_command(Path::new("vastool"), &req);
        assert_eq!(
            cmd.to_shell_string(),
            "'vastool' -u 'admin' -w 'pa'\"'\"'ss' unjoin -f"
        );
    }

    #[test]
    fn test_classify_steps() {
        let steps = classify_steps(JOIN_FAILED);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].result, StepResult::Success);
        assert_eq!(steps[1].message, "Joining computer to the domain");
        assert_eq!(steps[1].result, StepResult::Failed);
        assert_eq!(steps[2].message, "Invalid credentials");
        assert_eq!(steps[2].result, StepResult::Error);

        let steps = classify_steps(JOIN_OK);
        assert_eq!(steps[1].result, StepResult::Other("Done".into()));
        assert!(failure_summary(&steps).is_none());
    }

    #[test]
    fn test_error_lines_are_case_insensitive() {
        let steps = classify_steps("error: one\nError: two\nnot an error: three");
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.result == StepResult::Error));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("FAILED"), "Failed");
        assert_eq!(capitalize("success"), "Success");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_reconcile_join() {
        let dir = tempfile::tempdir().unwrap();
        let vastool = binary(dir.path(), "vastool", 0o755);
        let runner = runner("Domain: <N/A>\n", JOIN_OK);

        let outcome = reconcile(&runner, &vastool, "joined", &request("CORP.EXAMPLE"));
        assert!(!outcome.is_failed(), "{}", outcome.message());
        assert!(outcome.changed);
        assert_eq!(outcome.payload.action, Action::Join);
        assert_eq!(outcome.payload.version.as_str(), "5.1.5.23034");
        assert_eq!(outcome.payload.steps.len(), 3);
        assert!(runner.ran("join -f"));
    }

    #[test]
    fn test_reconcile_join_failure() {
        let dir = tempfile::tempdir().unwrap();
        let vastool = binary(dir.path(), "vastool", 0o755);
        let runner = runner("Domain: <N/A>\n", JOIN_FAILED);

        let outcome = reconcile(&runner, &vastool, "joined", &request("CORP.EXAMPLE"));
        assert!(!outcome.changed);
        assert_eq!(
            outcome.message(),
            "Failed: Joining computer to the domain\nError: Invalid credentials"
        );
        assert_eq!(outcome.payload.steps.len(), 3);
    }

    #[test]
    fn test_reconcile_join_rejected_without_steps() {
        let dir = tempfile::tempdir().unwrap();
        let vastool = binary(dir.path(), "vastool", 0o755);
        let usage = "vastool: unrecognized option '--bogus'\nUsage: vastool [options] join <domain>\n";
        let runner = ScriptedRunner::new()
            .reply("vastool' -v", 0, "vastool: QAS 5.1.5.23034")
            .reply("status -q", 0, "Domain: <N/A>\n")
            .reply(" join -f", 1, usage);

        let outcome = reconcile(&runner, &vastool, "joined", &request("CORP.EXAMPLE"));
        assert!(outcome.is_failed());
        assert!(!outcome.changed);
        assert!(outcome.payload.steps.is_empty());
        assert_eq!(outcome.message(), usage);
        assert_eq!(outcome.error.unwrap().kind(), ErrorKind::ParseFailure);
    }

    #[test]
    fn test_reconcile_already_joined_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let vastool = binary(dir.path(), "vastool", 0o755);
        let runner = runner("Domain: <CORP.EXAMPLE>\n", JOIN_OK);

        let outcome = reconcile(&runner, &vastool, "joined", &request("CORP.EXAMPLE"));
        assert!(!outcome.is_failed());
        assert!(!outcome.changed);
        assert_eq!(outcome.payload.version.as_str(), "5.1.5.23034");
        assert!(!runner.ran("join -f"));
    }

    #[test]
    fn test_reconcile_domain_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let vastool = binary(dir.path(), "vastool", 0o755);
        let runner = runner("Domain: <OTHER.EXAMPLE>\n", JOIN_OK);

        let outcome = reconcile(&runner, &vastool, "joined", &request("CORP.EXAMPLE"));
        assert_eq!(
            outcome.message(),
            "Cannot join domain CORP.EXAMPLE because already joined to domain OTHER.EXAMPLE"
        );
        assert!(!outcome.changed);
        assert!(!runner.ran("join -f"));
    }

    #[test]
    fn test_reconcile_unjoin() {
        let dir = tempfile::tempdir().unwrap();
        let vastool = binary(dir.path(), "vastool", 0o755);

        let joined = runner("Domain: <CORP.EXAMPLE>\n", "Removing computer object ... SUCCESS\n");
        let outcome = reconcile(&joined, &vastool, "unjoined", &request(""));
        assert!(outcome.changed);
        assert_eq!(outcome.payload.action, Action::Unjoin);

        let unjoined = runner("Domain: <N/A>\n", "");
        let outcome = reconcile(&unjoined, &vastool, "unjoined", &request(""));
        assert!(!outcome.is_failed());
        assert!(!outcome.changed);
        assert!(!unjoined.ran("unjoin"));
    }

    #[test]
    fn test_reconcile_invalid_state_spawns_nothing() {
        let runner = runner("", "");
        let outcome = reconcile(&runner, Path::new("/nonexistent"), "present", &request("X"));
        assert_eq!(outcome.error.unwrap().kind(), ErrorKind::InvalidState);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_reconcile_missing_vastool() {
        let runner = runner("", "");
        let outcome = reconcile(&runner, Path::new("/nonexistent/vastool"), "joined", &request("X"));
        assert_eq!(outcome.error.unwrap().kind(), ErrorKind::NotFound);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_join_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let vastool = binary(dir.path(), "vastool", 0o755);
        let req = request("CORP.EXAMPLE");

        let first = reconcile(&runner("Domain: <N/A>\n", JOIN_OK), &vastool, "joined", &req);
        assert!(first.changed);

        let second = reconcile(
            &runner("Domain: <CORP.EXAMPLE>\n", JOIN_OK),
            &vastool,
            "joined",
            &req,
        );
        assert!(!second.changed);
        assert!(!second.is_failed());
    }
}
