//! Pre-join checks with the `preflight` binary.
//!
//! Each line of `--csv` output is `code,_,_,description,message...`. Lines
//! are split on every comma, so quoted messages containing commas arrive in
//! pieces and are glued back together with `", "`.

use serde::Serialize;
use std::path::Path;

use crate::command::CommandLine;
use crate::error::Error;
use crate::probe;
use crate::runner::Runner;
use crate::types::{Outcome, StepRecord, StepResult, Version};

/// Seconds each network check may take.
pub const DEFAULT_TIMEOUT: u32 = 5;

/// Parameters for a preflight run.
#[derive(Debug, Clone)]
pub struct PreflightRequest {
    /// Domain to check against
    pub domain: String,
    /// Account that would join the host
    pub username: String,
    /// Its password
    pub password: String,
    /// Domain controllers to check instead of discovery
    pub servers: Vec<String>,
    /// Per-check timeout in seconds (`-t`)
    pub timeout: u32,
    /// Also check time synchronization (`-S`)
    pub timesync: bool,
    /// Shell fragment passed to preflight unchanged
    pub extra_args: String,
}

impl Default for PreflightRequest {
    fn default() -> Self {
        Self {
            domain: String::new(),
            username: String::new(),
            password: String::new(),
            servers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            timesync: false,
            extra_args: String::new(),
        }
    }
}

/// Preflight version and classified checks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreflightReport {
    /// preflight version
    pub version: Version,
    /// One record per check, in output order
    pub steps: Vec<StepRecord>,
}

/// `preflight -u U -w P --csv -t N [-S] [extra] DOMAIN [SERVER...]`
pub fn command(preflight: &Path, request: &PreflightRequest) -> CommandLine {
    let cmd = CommandLine::new(preflight)
        .option("-u", request.username.as_str())
        .secret("-w", request.password.as_str())
        .flag("--csv")
        .flag("-t")
        .flag(request.timeout.to_string());
    let cmd = if request.timesync { cmd.flag("-S") } else { cmd };
    cmd.raw(&request.extra_args)
        .value(request.domain.as_str())
        .values(request.servers.iter().map(String::as_str))
}

fn parse_line(line: &str) -> Option<StepRecord> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 5 {
        return None;
    }

    let message = fields[4..]
        .iter()
        .map(|f| f.trim().replace('"', ""))
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    Some(StepRecord {
        message,
        result: StepResult::from_code(fields[0]),
        description: Some(fields[3].trim().to_string()),
    })
}

/// Classify preflight output. Lines with fewer than five fields are ignored.
pub fn parse_steps(raw: &str) -> Vec<StepRecord> {
    raw.lines().filter_map(parse_line).collect()
}

/// Newline-joined `"Failure: <message>"` for every failed check.
pub fn failures(steps: &[StepRecord]) -> Option<String> {
    let failed: Vec<String> = steps
        .iter()
        .filter(|s| s.result == StepResult::Failure)
        .map(StepRecord::summary)
        .collect();
    (!failed.is_empty()).then(|| failed.join("\n"))
}

/// Probe and run preflight. The host is never changed.
pub fn run(runner: &dyn Runner, preflight: &Path, request: &PreflightRequest) -> Outcome<PreflightReport> {
    let mut report = PreflightReport::default();
    match probe::probe(runner, preflight, "-v") {
        Ok(version) => report.version = version,
        Err(err) => return Outcome::failed(err, report),
    }

    let result = match runner.run(&command(preflight, request)) {
        Ok(result) => result,
        Err(err) => return Outcome::failed(err, report),
    };
    report.steps = parse_steps(&result.output);
    log::info!("preflight ran {} checks", report.steps.len());
    if report.steps.is_empty() && !result.success() {
        return Outcome::failed(Error::ParseFailure(result.output), report);
    }

    match failures(&report.steps) {
        Some(summary) => Outcome::failed(Error::StepFailure(summary), report),
        None => Outcome::unchanged(report),
    }
}
