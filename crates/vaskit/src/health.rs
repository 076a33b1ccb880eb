//! Health checks from `vastool status -c`.

use serde::Serialize;
use std::path::Path;

use crate::command::CommandLine;
use crate::error::Error;
use crate::probe;
use crate::records;
use crate::runner::Runner;
use crate::types::{IssueRecord, Outcome, Severity, Version};

/// Message used when any issue is a failure.
pub const FAILED_MESSAGE: &str = "One or more QAS Status checks failed.";

/// vastool version and the issues it reported.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HealthReport {
    /// vastool version
    pub version: Version,
    /// Warnings and failures, in output order
    pub issues: Vec<IssueRecord>,
}

fn issue(row: &[String]) -> Option<IssueRecord> {
    let [tag, test_id, description, code, result, ..] = row else {
        return None;
    };
    if tag != "STATUS" {
        return None;
    }
    let severity = Severity::from_code(code)?;

    Some(IssueRecord {
        test_id: test_id.clone(),
        description: description.replace('`', ""),
        severity,
        result: result.replace('`', ""),
    })
}

/// Extract `STATUS` rows with a known severity. Everything else is dropped.
pub fn parse_issues(raw: &str) -> Vec<IssueRecord> {
    records::read(raw, false)
        .iter()
        .filter_map(|row| issue(row))
        .collect()
}

/// Decide the overall verdict.
///
/// With no issues at all, a failing exit means the output was not what we
/// expected, and it is surfaced verbatim.
pub fn verdict(issues: &[IssueRecord], exit_code: i32, raw: &str) -> Option<Error> {
    if issues.is_empty() && exit_code > 0 {
        return Some(Error::ParseFailure(raw.to_string()));
    }
    if issues.iter().any(|i| i.severity.is_failure()) {
        return Some(Error::StepFailure(FAILED_MESSAGE.to_string()));
    }
    None
}

/// Probe vastool and run its health checks. The host is never changed.
pub fn run(runner: &dyn Runner, vastool: &Path) -> Outcome<HealthReport> {
    let mut report = HealthReport::default();
    match probe::probe(runner, vastool, "-v") {
        Ok(version) => report.version = version,
        Err(err) => return Outcome::failed(err, report),
    }

    let result = match runner.run(&CommandLine::new(vastool).flag("status").flag("-c")) {
        Ok(result) => result,
        Err(err) => return Outcome::failed(err, report),
    };
    report.issues = parse_issues(&result.output);

    match verdict(&report.issues, result.exit_code, &result.output) {
        Some(err) => Outcome::failed(err, report),
        None => Outcome::unchanged(report),
    }
}
