//! Versions of the QAS binaries.

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use vaskit::Outcome;
use vaskit::runner::{Runner, ShellRunner};

use crate::Context;
use crate::ui;

/// One probed binary.
#[derive(Debug, Serialize)]
pub struct BinaryVersion {
    pub name: &'static str,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn run(ctx: &Context) -> Result<()> {
    let paths = ctx.paths();
    let runner = ShellRunner::new();
    let versions = vec![
        probe(&runner, "vastool", &paths.vastool, "-v"),
        probe(&runner, "preflight", &paths.preflight, "-v"),
        probe(&runner, "asdcom", &paths.asdcom, ""),
    ];

    super::report(ctx, &Outcome::unchanged(versions), |versions| {
        ui::header(&format!("adjoin {}", env!("CARGO_PKG_VERSION")));
        for binary in versions {
            match (&binary.version, &binary.error) {
                (Some(version), _) => ui::kv(binary.name, version),
                (None, Some(err)) => ui::kv(binary.name, &format!("unavailable ({err})")),
                (None, None) => ui::kv(binary.name, "unknown"),
            }
        }
    })
}

fn probe(runner: &dyn Runner, name: &'static str, path: &Path, flag: &str) -> BinaryVersion {
    let (version, error) = match vaskit::probe::probe(runner, path, flag) {
        Ok(version) => (Some(version.to_string()), None),
        Err(err) => {
            log::debug!("{name}: {err}");
            (None, Some(err.to_string()))
        }
    };

    BinaryVersion {
        name,
        path: path.to_path_buf(),
        version,
        error,
    }
}
