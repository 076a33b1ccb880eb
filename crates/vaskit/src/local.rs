//! Local accounts, from flat files or from directory services.
//!
//! macOS keeps accounts in directory services rather than `/etc/passwd`, so
//! there every record costs one `dscl . -read` per property.

use std::collections::HashMap;
use std::path::PathBuf;

use idmap::local::{read_group, read_passwd};
use idmap::{GroupEntry, PasswdEntry};

use crate::command::{CommandLine, quote};
use crate::error::{Error, Result};
use crate::runner::Runner;

/// Default passwd file.
pub const PASSWD_PATH: &str = "/etc/passwd";
/// Default group file.
pub const GROUP_PATH: &str = "/etc/group";

/// Where local accounts come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountSource {
    /// passwd and group files
    Files {
        /// 7-field user database
        passwd: PathBuf,
        /// 4-field group database
        group: PathBuf,
    },
    /// `dscl .` queries
    DirectoryService,
}

impl AccountSource {
    /// Directory services on macOS, the default files elsewhere.
    pub fn native() -> Self {
        if cfg!(target_os = "macos") {
            Self::DirectoryService
        } else {
            Self::files(PASSWD_PATH, GROUP_PATH)
        }
    }

    /// Read the given files.
    pub fn files(passwd: impl Into<PathBuf>, group: impl Into<PathBuf>) -> Self {
        Self::Files {
            passwd: passwd.into(),
            group: group.into(),
        }
    }
}

impl Default for AccountSource {
    fn default() -> Self {
        Self::native()
    }
}

/// Value of `prop` in `dscl . -read` output.
///
/// Single values are printed on the key's line. Values with embedded spaces
/// are printed on the line after the key. Anything else yields `""`.
pub fn read_property(output: &str, prop: &str) -> String {
    let lines: Vec<&str> = output.lines().collect();
    match lines.as_slice() {
        [line] if line.starts_with(prop) => {
            line.split(": ").nth(1).unwrap_or_default().to_string()
        }
        [_, value] => value.trim().to_string(),
        _ => String::new(),
    }
}

struct Dscl<'a> {
    runner: &'a dyn Runner,
}

impl Dscl<'_> {
    fn list(&self, kind: &str, noun: &str) -> Result<Vec<String>> {
        let cmd = CommandLine::new("dscl")
            .flag(".")
            .flag("-list")
            .flag(format!("/{kind}"));
        let result = self.runner.run(&cmd)?;
        if !result.success() {
            return Err(Error::CommandFailed(format!(
                "Failed to get list of {noun}. {}",
                result.output
            )));
        }
        Ok(result.output.lines().map(str::to_string).collect())
    }

    fn property(&self, kind: &str, name: &str, prop: &str) -> Result<String> {
        let cmd = CommandLine::new("dscl")
            .flag(".")
            .flag("-read")
            .raw(&format!("/{kind}/{}", quote(name)))
            .flag(prop);
        let result = self.runner.run(&cmd)?;
        if !result.success() {
            return Ok(String::new());
        }
        Ok(read_property(&result.output, prop))
    }

    fn users(&self) -> Result<Vec<PasswdEntry>> {
        self.list("Users", "users")?
            .into_iter()
            .map(|name| -> Result<PasswdEntry> {
                Ok(PasswdEntry {
                    uid: self.property("Users", &name, "UniqueID")?,
                    gid: self.property("Users", &name, "PrimaryGroupID")?,
                    gecos: self.property("Users", &name, "RealName")?,
                    home: self.property("Users", &name, "NFSHomeDirectory")?,
                    shell: self.property("Users", &name, "UserShell")?,
                    password: "*".to_string(),
                    name,
                })
            })
            .collect()
    }

    fn groups(&self) -> Result<Vec<GroupEntry>> {
        self.list("Groups", "groups")?
            .into_iter()
            .map(|name| -> Result<GroupEntry> {
                Ok(GroupEntry {
                    gid: self.property("Groups", &name, "PrimaryGroupID")?,
                    members: Some(self.property("Groups", &name, "GroupMembership")?),
                    password: "*".to_string(),
                    name,
                })
            })
            .collect()
    }
}

/// All local users.
pub fn users(runner: &dyn Runner, source: &AccountSource) -> Result<Vec<PasswdEntry>> {
    let users = match source {
        AccountSource::Files { passwd, .. } => read_passwd(passwd)?,
        AccountSource::DirectoryService => Dscl { runner }.users()?,
    };
    log::debug!("{} local users", users.len());
    Ok(users)
}

/// All local groups, members included.
pub fn groups(runner: &dyn Runner, source: &AccountSource) -> Result<Vec<GroupEntry>> {
    let groups = match source {
        AccountSource::Files { group, .. } => read_group(group)?,
        AccountSource::DirectoryService => Dscl { runner }.groups()?,
    };
    log::debug!("{} local groups", groups.len());
    Ok(groups)
}

/// Login name → GECOS of every local user.
pub fn gecos_by_login(
    runner: &dyn Runner,
    source: &AccountSource,
) -> Result<HashMap<String, String>> {
    Ok(users(runner, source)?
        .into_iter()
        .map(|u| (u.name, u.gecos))
        .collect())
}
