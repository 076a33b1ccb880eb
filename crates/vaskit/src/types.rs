//! Core types shared by the command parsers.

use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Raw result of one external command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Process exit code (`-1` if killed by a signal)
    pub exit_code: i32,
    /// stdout followed by stderr
    pub output: String,
}

impl CommandResult {
    /// Create a new result.
    pub fn new(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    /// True when the process exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Dotted version reported by a binary, e.g. `5.1.5.23034`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub String);

impl Version {
    /// Version text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification of a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepResult {
    /// Step passed
    Success,
    /// Informational only
    Information,
    /// Step was not run
    Skipped,
    /// Worth a look, not fatal
    Advisory,
    /// Step failed
    Failure,
    /// Step failed (vastool wording)
    Failed,
    /// `ERROR:` line
    Error,
    /// Unmapped result code
    Unknown,
    /// Any other result word printed by the tool
    Other(String),
}

impl StepResult {
    /// Map a result label to its variant.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Success" => Self::Success,
            "Information" => Self::Information,
            "Skipped" => Self::Skipped,
            "Advisory" => Self::Advisory,
            "Failure" => Self::Failure,
            "Failed" => Self::Failed,
            "Error" => Self::Error,
            "Unknown" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    /// Map a preflight result code (`0`-`4`) to its variant.
    pub fn from_code(code: &str) -> Self {
        match code {
            "0" => Self::Success,
            "1" => Self::Information,
            "2" => Self::Skipped,
            "3" => Self::Advisory,
            "4" => Self::Failure,
            _ => Self::Unknown,
        }
    }

    /// Label text.
    pub fn label(&self) -> &str {
        match self {
            Self::Success => "Success",
            Self::Information => "Information",
            Self::Skipped => "Skipped",
            Self::Advisory => "Advisory",
            Self::Failure => "Failure",
            Self::Failed => "Failed",
            Self::Error => "Error",
            Self::Unknown => "Unknown",
            Self::Other(label) => label,
        }
    }

    /// Whether this result fails the whole operation.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure | Self::Failed | Self::Error)
    }
}

impl fmt::Display for StepResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for StepResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One classified line of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// What the step reported
    pub message: String,
    /// How it ended
    pub result: StepResult,
    /// Check name (preflight only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl StepRecord {
    /// Create a step without a description.
    pub fn new(message: impl Into<String>, result: StepResult) -> Self {
        Self {
            message: message.into(),
            result,
            description: None,
        }
    }

    /// `"<result>: <message>"`, the form used in aggregate error messages.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.result, self.message)
    }
}

/// Newline-joined summaries of every failing step, or `None` if all passed.
pub fn failure_summary(steps: &[StepRecord]) -> Option<String> {
    let failures: Vec<String> = steps
        .iter()
        .filter(|s| s.result.is_failure())
        .map(StepRecord::summary)
        .collect();

    if failures.is_empty() {
        None
    } else {
        Some(failures.join("\n"))
    }
}

/// Severity of a health-check issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Code 1
    Warning,
    /// Code 2
    Failure,
    /// Code 3
    #[serde(rename = "Critical Failure")]
    CriticalFailure,
}

impl Severity {
    /// Map a severity code; unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Warning),
            "2" => Some(Self::Failure),
            "3" => Some(Self::CriticalFailure),
            _ => None,
        }
    }

    /// Whether an issue of this severity fails the health check.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure | Self::CriticalFailure)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warning => "Warning",
            Self::Failure => "Failure",
            Self::CriticalFailure => "Critical Failure",
        })
    }
}

/// One health-check finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    /// Check identifier
    pub test_id: String,
    /// What was checked
    pub description: String,
    /// How bad it is
    pub severity: Severity,
    /// What the check found
    pub result: String,
}

/// A local account that must authenticate with directory credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedUser {
    /// Local login name
    pub local_login_name: String,
    /// Directory account (`DOMAIN\user`)
    pub ad_account: String,
    /// GECOS of the local account, when it exists locally
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gecos: Option<String>,
}

/// Result of one public operation: error, host-changed flag and payload.
///
/// A failed outcome still carries whatever payload was gathered, so callers
/// can show the steps that led to the failure.
#[derive(Debug)]
pub struct Outcome<T> {
    /// Why the operation failed, if it did
    pub error: Option<Error>,
    /// Whether the host's state changed
    pub changed: bool,
    /// Operation-specific data
    pub payload: T,
}

impl<T> Outcome<T> {
    /// Successful, host unchanged.
    pub fn unchanged(payload: T) -> Self {
        Self {
            error: None,
            changed: false,
            payload,
        }
    }

    /// Successful, host changed.
    pub fn changed(payload: T) -> Self {
        Self {
            error: None,
            changed: true,
            payload,
        }
    }

    /// Failed; a failed outcome never reports a change.
    pub fn failed(error: Error, payload: T) -> Self {
        Self {
            error: Some(error),
            changed: false,
            payload,
        }
    }

    /// Whether the operation failed.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Error message, empty on success.
    pub fn message(&self) -> String {
        self.error.as_ref().map(ToString::to_string).unwrap_or_default()
    }

    /// Convert into a plain `Result`, dropping the payload on failure.
    pub fn into_result(self) -> Result<T> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.payload),
        }
    }

    /// Transform the payload.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            error: self.error,
            changed: self.changed,
            payload: f(self.payload),
        }
    }
}

impl<T: Default> Outcome<T> {
    /// Failed before anything was gathered.
    pub fn failed_empty(error: Error) -> Self {
        Self::failed(error, T::default())
    }
}

impl<T: Serialize> Serialize for Outcome<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Outcome", 4)?;
        state.serialize_field("changed", &self.changed)?;
        state.serialize_field("failed", &self.is_failed())?;
        state.serialize_field("msg", &self.message())?;
        state.serialize_field("payload", &self.payload)?;
        state.end()
    }
}
