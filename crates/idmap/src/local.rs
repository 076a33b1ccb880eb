//! Local account databases (`/etc/passwd`, `/etc/group`).

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// One 7-field passwd record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswdEntry {
    /// Login name
    pub name: String,
    /// Password placeholder (`x` or `*`)
    pub password: String,
    /// UID
    pub uid: String,
    /// Primary GID
    pub gid: String,
    /// GECOS field
    pub gecos: String,
    /// Home directory
    pub home: String,
    /// Login shell
    pub shell: String,
}

impl PasswdEntry {
    /// Parse a colon-delimited line. Lines without exactly 7 fields are rejected.
    pub fn from_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(':').collect();
        let [name, password, uid, gid, gecos, home, shell] = fields.as_slice() else {
            return None;
        };
        Some(Self {
            name: (*name).to_string(),
            password: (*password).to_string(),
            uid: (*uid).to_string(),
            gid: (*gid).to_string(),
            gecos: (*gecos).to_string(),
            home: (*home).to_string(),
            shell: (*shell).to_string(),
        })
    }
}

/// One 4-field group record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    /// Group name
    pub name: String,
    /// Password placeholder
    pub password: String,
    /// GID
    pub gid: String,
    /// Comma-separated member list; `None` once members are stripped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<String>,
}

impl GroupEntry {
    /// Parse a colon-delimited line. Lines without exactly 4 fields are rejected.
    pub fn from_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split(':').collect();
        let [name, password, gid, members] = fields.as_slice() else {
            return None;
        };
        Some(Self {
            name: (*name).to_string(),
            password: (*password).to_string(),
            gid: (*gid).to_string(),
            members: Some((*members).to_string()),
        })
    }
}

/// Trimmed lines that are neither blank nor `#` comments.
pub fn content_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

/// Parse passwd content, skipping malformed lines.
pub fn parse_passwd(content: &str) -> Vec<PasswdEntry> {
    content_lines(content)
        .filter_map(|line| {
            let entry = PasswdEntry::from_line(line);
            if entry.is_none() {
                log::warn!("skipping malformed passwd line: {line}");
            }
            entry
        })
        .collect()
}

/// Parse group content, skipping malformed lines.
pub fn parse_group(content: &str) -> Vec<GroupEntry> {
    content_lines(content)
        .filter_map(|line| {
            let entry = GroupEntry::from_line(line);
            if entry.is_none() {
                log::warn!("skipping malformed group line: {line}");
            }
            entry
        })
        .collect()
}

/// Read and parse a passwd file.
pub fn read_passwd(path: &Path) -> Result<Vec<PasswdEntry>> {
    Ok(parse_passwd(&read_lossy(path)?))
}

/// Read and parse a group file.
pub fn read_group(path: &Path) -> Result<Vec<GroupEntry>> {
    Ok(parse_group(&read_lossy(path)?))
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Local users that clash with a planned account.
///
/// A clash is the same name with a different UID, or a different name with
/// the same UID.
pub fn user_conflicts<'a>(
    users: &'a [PasswdEntry],
    user_name: &str,
    uid_number: &str,
) -> Vec<&'a PasswdEntry> {
    users
        .iter()
        .filter(|u| (u.name == user_name) != (u.uid == uid_number))
        .collect()
}

/// Criteria for selecting local groups. Empty criteria match everything.
#[derive(Debug, Clone)]
pub struct GroupFilter {
    /// Substring of the group name
    pub name: String,
    /// Exact GID
    pub gid: String,
    /// Comma-separated user names; a group matches if any appears in its members
    pub members: String,
    /// Keep the members column in the output
    pub include_members: bool,
}

impl Default for GroupFilter {
    fn default() -> Self {
        Self {
            name: String::new(),
            gid: String::new(),
            members: String::new(),
            include_members: true,
        }
    }
}

impl GroupFilter {
    /// Whether a group passes the name, GID and member criteria.
    pub fn matches(&self, group: &GroupEntry) -> bool {
        if !self.name.is_empty() && !group.name.contains(&self.name) {
            return false;
        }
        if !self.gid.is_empty() && group.gid != self.gid {
            return false;
        }
        if !self.members.is_empty() {
            let members = group.members.as_deref().unwrap_or_default();
            return self.members.split(',').any(|m| members.contains(m));
        }
        true
    }

    /// Apply the filter, stripping members if requested.
    pub fn apply(&self, groups: Vec<GroupEntry>) -> Vec<GroupEntry> {
        groups
            .into_iter()
            .filter(|g| self.matches(g))
            .map(|mut g| {
                if !self.include_members {
                    g.members = None;
                }
                g
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWD: &str = "\
# local accounts
root:x:0:0:root:/root:/bin/bash

daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
broken:x:2
eripley:x:1003:1003:Ellen Ripley:/home/eripley:/bin/bash
";

    const GROUP: &str = "\
root:x:0:
wheel:x:10:alice,bob
developers:x:1000:carol
#comment:x:1:
bad:x
";

    #[test]
    fn test_parse_passwd_skips_comments_and_malformed() {
        let users = parse_passwd(PASSWD);
        let names: Vec<_> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["root", "daemon", "eripley"]);
        assert_eq!(users[2].gecos, "Ellen Ripley");
        assert_eq!(users[2].shell, "/bin/bash");
    }

    #[test]
    fn test_parse_group() {
        let groups = parse_group(GROUP);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[1].members.as_deref(), Some("alice,bob"));
        assert_eq!(groups[0].members.as_deref(), Some(""));
    }

    #[test]
    fn test_user_conflicts() {
        let users = parse_passwd(PASSWD);

        // Same name, different uid
        let hits = user_conflicts(&users, "eripley", "2000");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uid, "1003");

        // Different name, same uid
        let hits = user_conflicts(&users, "newuser", "1003");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "eripley");

        // Exact match is not a conflict
        assert!(user_conflicts(&users, "eripley", "1003").is_empty());
    }

    #[test]
    fn test_group_filter() {
        let groups = parse_group(GROUP);

        let by_name = GroupFilter {
            name: "dev".into(),
            ..GroupFilter::default()
        };
        assert_eq!(by_name.apply(groups.clone()).len(), 1);

        let by_member = GroupFilter {
            members: "zed,bob".into(),
            ..GroupFilter::default()
        };
        let hits = by_member.apply(groups.clone());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "wheel");

        let by_gid = GroupFilter {
            gid: "0".into(),
            include_members: false,
            ..GroupFilter::default()
        };
        let hits = by_gid.apply(groups);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].members, None);
    }

    #[test]
    fn test_read_passwd_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passwd");
        std::fs::write(&path, PASSWD).unwrap();

        assert_eq!(read_passwd(&path).unwrap().len(), 3);
        assert!(matches!(
            read_passwd(&dir.path().join("missing")),
            Err(Error::Read { .. })
        ));
    }
}
