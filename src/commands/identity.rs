//! Offline checks over exported directory objects and policy reports.

use anyhow::{Context as _, Result};
use idmap::{ConflictSet, DirectoryObject, GroupAttributes, UserAttributes, UserPolicy};
use std::path::Path;
use vaskit::Outcome;

use crate::Context;
use crate::cli::{GroupExportArgs, IdentityCommand, UserExportArgs};
use crate::ui;

pub fn conflicts(ctx: &Context, cmd: IdentityCommand) -> Result<()> {
    let set = match cmd {
        IdentityCommand::Users(args) => {
            let objects = read_objects(&args.input)?;
            idmap::user_conflicts(&objects, &user_attributes(&args))
        }
        IdentityCommand::Groups(args) => {
            let objects = read_objects(&args.input)?;
            idmap::group_conflicts(&objects, &group_attributes(&args))
        }
    };

    super::report(ctx, &Outcome::unchanged(set), print_conflicts)
}

pub fn unix_enabled(ctx: &Context, cmd: IdentityCommand) -> Result<()> {
    match cmd {
        IdentityCommand::Users(args) => {
            let objects = read_objects(&args.input)?;
            let users = idmap::extract::extract_users(&objects, &user_attributes(&args));
            super::report(ctx, &Outcome::unchanged(users), |users| {
                ui::header(&format!("{} Unix-enabled", ui::count(users.len(), "user")));
                let rows: Vec<Vec<String>> = users
                    .iter()
                    .map(|u| {
                        vec![
                            u.login_name.clone(),
                            u.uid_number.clone(),
                            u.gid_number.clone(),
                            u.home_directory.clone(),
                            u.login_shell.clone(),
                        ]
                    })
                    .collect();
                ui::table(&["LOGIN", "UID", "GID", "HOME", "SHELL"], &rows);
            })
        }
        IdentityCommand::Groups(args) => {
            let objects = read_objects(&args.input)?;
            let groups = idmap::extract::extract_groups(&objects, &group_attributes(&args));
            super::report(ctx, &Outcome::unchanged(groups), |groups| {
                ui::header(&format!("{} Unix-enabled", ui::count(groups.len(), "group")));
                let rows: Vec<Vec<String>> = groups
                    .iter()
                    .map(|g| vec![g.name.clone(), g.gid_number.clone()])
                    .collect();
                ui::table(&["NAME", "GID"], &rows);
            })
        }
    }
}

pub fn policy_by_user(ctx: &Context, input: &Path) -> Result<()> {
    let policies = load_policies(input)?;
    super::report(ctx, &Outcome::unchanged(policies), |policies| {
        ui::header("Logon Policy by User");
        let rows: Vec<Vec<String>> = policies
            .iter()
            .map(|p| vec![p.user.name.clone(), p.user.uid.clone(), p.hosts.join(", ")])
            .collect();
        ui::table(&["USER", "UID", "HOSTS"], &rows);
    })
}

fn read_objects(path: &Path) -> Result<Vec<DirectoryObject>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    idmap::extract::parse_objects(&json)
        .with_context(|| format!("Invalid directory export: {}", path.display()))
}

fn load_policies(path: &Path) -> Result<Vec<UserPolicy>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    let report = idmap::policy::parse_report(&json)
        .with_context(|| format!("Invalid users-allowed report: {}", path.display()))?;
    Ok(idmap::policy::by_user(&report))
}

fn user_attributes(args: &UserExportArgs) -> UserAttributes {
    UserAttributes {
        login_name: args.login_name_attr.clone(),
        uid_number: args.uid_number_attr.clone(),
        gid_number: args.gid_number_attr.clone(),
        gecos: args.gecos_attr.clone(),
        home_directory: args.home_directory_attr.clone(),
        login_shell: args.login_shell_attr.clone(),
    }
}

fn group_attributes(args: &GroupExportArgs) -> GroupAttributes {
    GroupAttributes {
        name: args.name_attr.clone(),
        gid_number: args.gid_number_attr.clone(),
    }
}

fn print_conflicts(set: &ConflictSet) {
    if set.is_empty() {
        ui::success("No ID conflicts");
        return;
    }

    ui::warn(&format!("{} shared by more than one identity", ui::count(set.len(), "ID")));
    for conflict in set {
        ui::section(&conflict.numeric_id);
        for member in &conflict.members {
            println!("  {}", member.name);
            ui::dim(&member.distinguished_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    const EXPORT: &str = r#"[
        {"DistinguishedName": "CN=a,DC=example", "sAMAccountName": "a", "uidNumber": "1000",
         "gidNumber": "100", "unixHomeDirectory": "/home/a", "loginShell": "/bin/bash"},
        {"DistinguishedName": "CN=b,DC=example", "sAMAccountName": "b", "uidNumber": "1000",
         "gidNumber": "100", "unixHomeDirectory": "/home/b", "loginShell": "/bin/sh"},
        {"DistinguishedName": "CN=c,DC=example", "sAMAccountName": "c", "uidNumber": "1001",
         "gidNumber": "100", "unixHomeDirectory": "/home/c", "loginShell": "/bin/false"}
    ]"#;

    fn user_args(input: &Path) -> UserExportArgs {
        let cli = Cli::try_parse_from([
            "adjoin",
            "conflicts",
            "users",
            "-i",
            input.to_str().unwrap(),
        ])
        .unwrap();
        match cli.command {
            Command::Conflicts(IdentityCommand::Users(args)) => args,
            _ => panic!("expected conflicts users"),
        }
    }

    #[test]
    fn test_user_conflicts_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, EXPORT).unwrap();

        let args = user_args(&path);
        let objects = read_objects(&args.input).unwrap();
        let set = idmap::user_conflicts(&objects, &user_attributes(&args));

        assert_eq!(set.len(), 1);
        let members = set.get("1000").unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, "a");
        assert_eq!(members[1].name, "b");
    }

    #[test]
    fn test_default_attribute_names() {
        let attrs = user_attributes(&user_args(Path::new("x.json")));
        assert_eq!(attrs, UserAttributes::default());
    }

    #[test]
    fn test_read_objects_rejects_non_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let err = read_objects(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid directory export"));
    }

    #[test]
    fn test_missing_input() {
        let err = read_objects(Path::new("/nonexistent/export.json")).unwrap_err();
        assert!(err.to_string().contains("Could not read"));
    }

    #[test]
    fn test_policies_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(
            &path,
            r#"{
                "host1": [["alice", "x", "1000", "100", "Alice", "/home/alice", "/bin/bash"]],
                "host2": [["alice", "x", "1000", "100", "Alice", "/home/alice", "/bin/bash"],
                          ["bob", "x", "1001", "100", "Bob", "/home/bob", "/bin/sh"]]
            }"#,
        )
        .unwrap();

        let policies = load_policies(&path).unwrap();
        assert_eq!(policies.len(), 2);
        assert_eq!(policies[0].user.name, "alice");
        assert_eq!(policies[0].hosts, ["host1", "host2"]);
        assert_eq!(policies[1].hosts, ["host2"]);
    }
}
