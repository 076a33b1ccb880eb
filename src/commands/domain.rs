//! Domain membership: join, unjoin, status.

use anyhow::Result;
use vaskit::{Action, JoinReport, JoinRequest, JoinState, Outcome};

use crate::Context;
use crate::cli::{JoinArgs, UnjoinArgs};
use crate::progress;
use crate::ui;

pub fn join(ctx: &Context, args: JoinArgs) -> Result<()> {
    let request = JoinRequest {
        domain: args.domain,
        username: args.credentials.username,
        password: args.credentials.password,
        account_name: args.account_name.unwrap_or_default(),
        container: args.container.unwrap_or_default(),
        servers: args.servers,
        extra_args: args.extra_args.unwrap_or_default(),
    };

    let pb = progress::spinner(&format!("Joining {}...", request.domain), ctx.hidden());
    let outcome = ctx.client().reconcile("joined", &request);
    finish(&pb, &outcome, &request.domain);

    super::report(ctx, &outcome, print_report)
}

pub fn unjoin(ctx: &Context, args: UnjoinArgs) -> Result<()> {
    let request = JoinRequest {
        username: args.credentials.username,
        password: args.credentials.password,
        account_name: args.account_name.unwrap_or_default(),
        extra_args: args.extra_args.unwrap_or_default(),
        ..JoinRequest::default()
    };

    let pb = progress::spinner("Leaving domain...", ctx.hidden());
    let outcome = ctx.client().reconcile("unjoined", &request);
    let domain = outcome
        .payload
        .previous
        .domain()
        .unwrap_or_default()
        .to_string();
    finish(&pb, &outcome, &domain);

    super::report(ctx, &outcome, print_report)
}

pub fn status(ctx: &Context) -> Result<()> {
    let outcome = ctx.client().join_status();
    super::report(ctx, &outcome, |status| {
        ui::header("Domain Status");
        ui::kv("vastool", status.version.as_str());
        match &status.domain {
            Some(domain) => ui::kv("domain", domain),
            None => ui::kv("domain", "not joined"),
        }
    })
}

fn finish(pb: &indicatif::ProgressBar, outcome: &Outcome<JoinReport>, domain: &str) {
    if outcome.is_failed() {
        progress::finish_error(pb, "Reconciliation failed");
        return;
    }

    let msg = match outcome.payload.action {
        Action::Join => format!("Joined {domain}"),
        Action::Unjoin => format!("Left {domain}"),
        Action::Nothing => match &outcome.payload.previous {
            JoinState::Joined(current) => format!("Already joined to {current}"),
            JoinState::NotJoined => "Not joined to any domain".to_string(),
        },
    };
    progress::finish_success(pb, &msg);
}

fn print_report(report: &JoinReport) {
    if report.action == Action::Nothing && report.steps.is_empty() {
        return;
    }

    ui::section("vastool");
    if !report.version.as_str().is_empty() {
        ui::kv("version", report.version.as_str());
    }
    if report.action != Action::Nothing {
        ui::section("Steps");
        ui::steps(&report.steps);
    }
}
