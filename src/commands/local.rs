//! Local account listings.

use anyhow::Result;
use idmap::{GroupEntry, GroupFilter};

use crate::Context;
use crate::cli::{LocalGroupsArgs, LocalUsersArgs};
use crate::ui;

pub fn users(ctx: &Context, args: LocalUsersArgs) -> Result<()> {
    let client = ctx.client();
    let outcome = match (&args.conflicts_with, &args.uid) {
        (Some(name), Some(uid)) => client.local_user_conflicts(name, uid),
        _ => client.local_users(),
    };

    super::report(ctx, &outcome, |users| {
        match &args.conflicts_with {
            Some(name) if users.is_empty() => {
                ui::success(&format!("No local user clashes with {name}"));
                return;
            }
            Some(name) => ui::header(&format!("Local users clashing with {name}")),
            None => ui::header("Local Users"),
        }
        super::access::passwd_table(users);
    })
}

pub fn groups(ctx: &Context, args: LocalGroupsArgs) -> Result<()> {
    let filter = group_filter(args);
    let outcome = ctx.client().local_groups(&filter);

    super::report(ctx, &outcome, |groups| {
        ui::header("Local Groups");
        print_groups(groups, filter.include_members);
    })
}

fn group_filter(args: LocalGroupsArgs) -> GroupFilter {
    GroupFilter {
        name: args.name.unwrap_or_default(),
        gid: args.gid.unwrap_or_default(),
        members: args.member.unwrap_or_default(),
        include_members: !args.no_members,
    }
}

fn print_groups(groups: &[GroupEntry], include_members: bool) {
    if groups.is_empty() {
        ui::dim("No matching groups");
        return;
    }

    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|g| {
            let mut row = vec![g.name.clone(), g.gid.clone()];
            if include_members {
                row.push(g.members.clone().unwrap_or_default());
            }
            row
        })
        .collect();

    if include_members {
        ui::table(&["NAME", "GID", "MEMBERS"], &rows);
    } else {
        ui::table(&["NAME", "GID"], &rows);
    }
}
