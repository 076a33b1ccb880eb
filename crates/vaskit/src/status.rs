//! Current join state from `vastool status -q`.

use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;

use crate::command::CommandLine;
use crate::error::Result;
use crate::runner::Runner;

static DOMAIN_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Domain: <(\S+)>$").expect("valid regex"));

/// Whether, and where, the host is joined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "domain", rename_all = "snake_case")]
pub enum JoinState {
    /// Joined to the named domain
    Joined(String),
    /// Not joined
    #[default]
    NotJoined,
}

impl JoinState {
    /// Derive the state from status output.
    pub fn from_status_output(raw: &str) -> Self {
        current_domain(raw).map_or(Self::NotJoined, Self::Joined)
    }

    /// The joined domain, if any.
    pub fn domain(&self) -> Option<&str> {
        match self {
            Self::Joined(domain) => Some(domain),
            Self::NotJoined => None,
        }
    }

    /// True when joined to any domain.
    pub fn is_joined(&self) -> bool {
        matches!(self, Self::Joined(_))
    }
}

/// The domain named on the first `Domain: <X>` line, or `None` for `N/A` or
/// when no such line exists.
pub fn current_domain(raw: &str) -> Option<String> {
    let domain = DOMAIN_LINE.captures(raw)?.get(1)?.as_str();
    (domain != "N/A").then(|| domain.to_string())
}

/// Ask `vastool status -q` where the host is joined.
///
/// The exit code is ignored: an unjoined host reports a non-zero status.
pub fn query(runner: &dyn Runner, vastool: &Path) -> Result<JoinState> {
    let result = runner.run(&CommandLine::new(vastool).flag("status").flag("-q"))?;
    let state = JoinState::from_status_output(&result.output);
    log::debug!("join state: {state:?}");
    Ok(state)
}
