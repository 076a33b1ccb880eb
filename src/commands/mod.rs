//! Subcommand implementations.

pub mod access;
pub mod diagnostics;
pub mod domain;
pub mod identity;
pub mod local;
pub mod version;

use anyhow::{Result, bail};
use serde::Serialize;
use vaskit::Outcome;

use crate::Context;

/// Print an outcome and turn a failed one into an error.
///
/// With `--json` the whole `{changed, failed, msg, payload}` envelope goes to
/// stdout; otherwise `human` renders the payload. The payload is printed even
/// on failure, since it holds the steps that led there.
pub fn report<T: Serialize>(ctx: &Context, outcome: &Outcome<T>, human: impl FnOnce(&T)) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    } else if !ctx.quiet || outcome.is_failed() {
        human(&outcome.payload);
    }

    match &outcome.error {
        Some(err) => bail!("{err}"),
        None => Ok(()),
    }
}
