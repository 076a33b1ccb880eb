//! Logon policy regrouped by user.
//!
//! `vastool list users-allowed` reports, per host, the directory users that
//! may log on. This module turns a host → users report into user → hosts.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::local::PasswdEntry;

/// One user and every host that allows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPolicy {
    /// The record as first reported
    pub user: PasswdEntry,
    /// Hosts allowing the user, in host order
    pub hosts: Vec<String>,
}

/// Allowed users for each host, in report order.
pub type HostReport = Vec<(String, Vec<PasswdEntry>)>;

/// Regroup host → allowed users into user → hosts.
///
/// Users are keyed by login name and listed in first-seen order.
pub fn by_user(per_host: &[(String, Vec<PasswdEntry>)]) -> Vec<UserPolicy> {
    let mut policies: Vec<UserPolicy> = Vec::new();

    for (host, users) in per_host {
        for user in users {
            match policies.iter_mut().find(|p| p.user.name == user.name) {
                Some(policy) => policy.hosts.push(host.clone()),
                None => policies.push(UserPolicy {
                    user: user.clone(),
                    hosts: vec![host.clone()],
                }),
            }
        }
    }

    policies
}

/// Host entries as they appear in the report. A map would reorder them.
struct RawReport(Vec<(String, Vec<Vec<String>>)>);

impl<'de> Deserialize<'de> for RawReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = RawReport;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of host to passwd rows")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<RawReport, A::Error> {
                let mut hosts = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    hosts.push(entry);
                }
                Ok(RawReport(hosts))
            }
        }

        deserializer.deserialize_map(ReportVisitor)
    }
}

/// Build a record from one 7-element row. Fields may contain `:`.
fn passwd_from_row(row: &[String]) -> Option<PasswdEntry> {
    let [name, password, uid, gid, gecos, home, shell] = row else {
        return None;
    };
    Some(PasswdEntry {
        name: name.clone(),
        password: password.clone(),
        uid: uid.clone(),
        gid: gid.clone(),
        gecos: gecos.clone(),
        home: home.clone(),
        shell: shell.clone(),
    })
}

/// Parse a `{ "host": [[7 fields], ...] }` report, keeping host order.
pub fn parse_report(json: &str) -> Result<HostReport> {
    let RawReport(raw) = serde_json::from_str(json)?;

    let mut report = Vec::with_capacity(raw.len());
    for (host, rows) in raw {
        let mut users = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let entry = passwd_from_row(row).ok_or_else(|| Error::Parse {
                index,
                message: format!("{host}: expected 7 fields, got {}", row.len()),
            })?;
            users.push(entry);
        }
        report.push((host, users));
    }

    Ok(report)
}
