//! Health checks and preflight.

use anyhow::Result;
use vaskit::{HealthReport, PreflightReport, PreflightRequest};

use crate::Context;
use crate::cli::PreflightArgs;
use crate::config::PreflightConfig;
use crate::progress;
use crate::ui;

pub fn health(ctx: &Context) -> Result<()> {
    let pb = progress::spinner("Running status checks...", ctx.hidden());
    let outcome = ctx.client().health();
    pb.finish_and_clear();

    super::report(ctx, &outcome, print_health)
}

pub fn preflight(ctx: &Context, args: PreflightArgs) -> Result<()> {
    let mut paths = ctx.paths();
    if let Some(path) = &args.path {
        paths.preflight = path.clone();
    }
    let request = preflight_request(args, &ctx.config.preflight);

    let pb = progress::spinner(
        &format!("Checking readiness to join {}...", request.domain),
        ctx.hidden(),
    );
    let outcome = ctx.client().paths(paths).preflight(&request);
    if outcome.is_failed() {
        progress::finish_error(&pb, "Preflight found problems");
    } else {
        progress::finish_success(&pb, "Preflight passed");
    }

    super::report(ctx, &outcome, print_preflight)
}

/// Command-line values win over the config file.
fn preflight_request(args: PreflightArgs, defaults: &PreflightConfig) -> PreflightRequest {
    PreflightRequest {
        domain: args.domain,
        username: args.credentials.username,
        password: args.credentials.password,
        servers: args.servers,
        timeout: args.timeout.unwrap_or(defaults.timeout),
        timesync: args.timesync || defaults.timesync,
        extra_args: args.extra_args.unwrap_or_default(),
    }
}

fn print_health(report: &HealthReport) {
    ui::header("QAS Status");
    if !report.version.as_str().is_empty() {
        ui::kv("vastool", report.version.as_str());
    }

    if report.issues.is_empty() {
        println!();
        ui::success("All status checks passed");
        return;
    }

    ui::section(&ui::count(report.issues.len(), "issue"));
    for issue in &report.issues {
        println!(
            "  {:<16} {:<8} {}",
            ui::severity_label(issue.severity),
            issue.test_id,
            issue.description
        );
        ui::dim(&issue.result);
    }
}

fn print_preflight(report: &PreflightReport) {
    ui::header("Preflight");
    if !report.version.as_str().is_empty() {
        ui::kv("preflight", report.version.as_str());
    }
    ui::section("Checks");
    ui::steps(&report.steps);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    fn args(extra: &[&str]) -> PreflightArgs {
        let mut argv = vec!["adjoin", "preflight", "corp.example.com", "-u", "admin", "-w", "pw"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Preflight(args) => args,
            _ => panic!("expected preflight"),
        }
    }

    #[test]
    fn test_request_uses_config_defaults() {
        let defaults = PreflightConfig {
            timeout: 12,
            timesync: true,
        };
        let request = preflight_request(args(&[]), &defaults);
        assert_eq!(request.timeout, 12);
        assert!(request.timesync);
        assert_eq!(request.domain, "corp.example.com");
        assert!(request.extra_args.is_empty());
    }

    #[test]
    fn test_flags_override_config() {
        let request = preflight_request(
            args(&["-t", "30", "-s", "dc1", "--extra-args", "--verbose"]),
            &PreflightConfig::default(),
        );
        assert_eq!(request.timeout, 30);
        assert!(!request.timesync);
        assert_eq!(request.servers, ["dc1"]);
        assert_eq!(request.extra_args, "--verbose");
    }
}
