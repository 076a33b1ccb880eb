//! Who may log on: mapped users, allow/deny files, logon policy.

use anyhow::Result;
use idmap::PasswdEntry;
use vaskit::{AccessControl, LogonPolicy, MappedUser};

use crate::Context;
use crate::ui;

pub fn mapped_users(ctx: &Context) -> Result<()> {
    let outcome = ctx.client().mapped_users();
    super::report(ctx, &outcome, |users| print_mapped(users))
}

pub fn access(ctx: &Context) -> Result<()> {
    let outcome = ctx.client().access_control();
    super::report(ctx, &outcome, print_access)
}

pub fn logon_policy(ctx: &Context) -> Result<()> {
    let outcome = ctx.client().logon_policy();
    super::report(ctx, &outcome, print_logon_policy)
}

fn print_mapped(users: &[MappedUser]) {
    ui::header("Mapped Users");
    if users.is_empty() {
        ui::dim("No mapped users");
        return;
    }

    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.local_login_name.clone(),
                u.ad_account.clone(),
                u.gecos.clone().unwrap_or_default(),
            ]
        })
        .collect();
    ui::table(&["LOCAL", "DIRECTORY ACCOUNT", "GECOS"], &rows);
}

fn print_access(control: &AccessControl) {
    ui::header("Access Control");
    if !control.version.as_str().is_empty() {
        ui::kv("vastool", control.version.as_str());
    }

    for (title, path, entries) in [
        ("Allow", &control.users_allow_file, &control.users_allow),
        ("Deny", &control.users_deny_file, &control.users_deny),
    ] {
        ui::section(title);
        ui::kv("file", &path.display().to_string());
        if entries.is_empty() {
            ui::dim("(empty)");
        }
        for entry in entries {
            println!("    {entry}");
        }
    }
}

fn print_logon_policy(policy: &LogonPolicy) {
    ui::header("Logon Policy");
    if !policy.version.as_str().is_empty() {
        ui::kv("vastool", policy.version.as_str());
    }
    ui::section(&format!(
        "{} allowed",
        ui::count(policy.users_allowed.len(), "user")
    ));
    passwd_table(&policy.users_allowed);
}

/// Print passwd records as a table.
pub fn passwd_table(users: &[PasswdEntry]) {
    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.name.clone(),
                u.uid.clone(),
                u.gid.clone(),
                u.gecos.clone(),
                u.home.clone(),
                u.shell.clone(),
            ]
        })
        .collect();
    ui::table(&["NAME", "UID", "GID", "GECOS", "HOME", "SHELL"], &rows);
}
