//! Local users that log on with directory credentials.
//!
//! `asdcom GetMappedUsers` prints a header row and then one CSV row per
//! mapping: `UPN,ULoginName,UniqueID,NTName,SourceFile`. Mappings sourced
//! from NSS are not local accounts and are left out.

use std::path::Path;

use crate::command::CommandLine;
use crate::local::{self, AccountSource};
use crate::probe;
use crate::records;
use crate::runner::Runner;
use crate::status;
use crate::types::{MappedUser, Outcome};

/// Suffix of the source column for NSS mappings.
const NSS_SUFFIX: &str = "NSS";

/// Parse `GetMappedUsers` output. The first row is always the header.
pub fn parse_mapped_users(raw: &str) -> Vec<MappedUser> {
    records::read(raw, true)
        .into_iter()
        .filter(|row| !row.last().is_some_and(|source| source.ends_with(NSS_SUFFIX)))
        .filter_map(|row| match row.as_slice() {
            [_, login, _, account, ..] => Some(MappedUser {
                local_login_name: login.clone(),
                ad_account: account.clone(),
                gecos: None,
            }),
            _ => {
                log::warn!("skipping short mapping row: {}", row.join(","));
                None
            }
        })
        .collect()
}

/// List mapped users, with the GECOS of each local account.
///
/// An unjoined host has no mappings. A lister that exits non-zero yields an
/// empty list as well.
pub fn run(
    runner: &dyn Runner,
    vastool: &Path,
    asdcom: &Path,
    source: &AccountSource,
) -> Outcome<Vec<MappedUser>> {
    let lookup = || -> crate::Result<Vec<MappedUser>> {
        probe::probe(runner, vastool, "-v")?;
        if !status::query(runner, vastool)?.is_joined() {
            log::info!("host is not joined, no mapped users");
            return Ok(Vec::new());
        }

        probe::probe(runner, asdcom, "")?;
        let result = runner.run(&CommandLine::new(asdcom).flag("GetMappedUsers"))?;
        if !result.success() {
            log::warn!("GetMappedUsers exited with {}", result.exit_code);
            return Ok(Vec::new());
        }

        let mut users = parse_mapped_users(&result.output);
        let gecos = local::gecos_by_login(runner, source)?;
        for user in &mut users {
            user.gecos = gecos.get(&user.local_login_name).cloned();
        }
        Ok(users)
    };

    match lookup() {
        Ok(users) => Outcome::unchanged(users),
        Err(err) => Outcome::failed_empty(err),
    }
}
