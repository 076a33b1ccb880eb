//! Normalized identity records.
//!
//! Both extraction strategies in [`crate::extract`] produce these records, so
//! the conflict scan never has to know which directory schema the data came
//! from.

use serde::{Deserialize, Serialize};

/// The three fields the conflict scan compares on.
///
/// Missing values are stored as empty strings so two records compare equal
/// exactly when every field matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedIdentity {
    /// Directory distinguished name (`CN=...,DC=...`)
    pub distinguished_name: String,
    /// Login name or group name
    pub name: String,
    /// UID or GID number, kept as text
    pub numeric_id: String,
}

impl NormalizedIdentity {
    /// Create a new identity.
    pub fn new(
        distinguished_name: impl Into<String>,
        name: impl Into<String>,
        numeric_id: impl Into<String>,
    ) -> Self {
        Self {
            distinguished_name: distinguished_name.into(),
            name: name.into(),
            numeric_id: numeric_id.into(),
        }
    }
}

/// Shell that marks an account as disabled for Unix logon.
pub const DISABLED_SHELL: &str = "/bin/false";

/// A Unix-enabled Active Directory user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnixUser {
    /// Directory distinguished name
    pub distinguished_name: String,
    /// Unix login name
    pub login_name: String,
    /// UID number
    pub uid_number: String,
    /// Primary GID number
    pub gid_number: String,
    /// GECOS / comment field
    pub gecos: String,
    /// Home directory
    pub home_directory: String,
    /// Login shell
    pub login_shell: String,
}

impl UnixUser {
    /// A user is Unix-enabled when it has a UID, a primary GID, a home
    /// directory and a login shell other than `/bin/false`.
    pub fn is_unix_enabled(&self) -> bool {
        !self.uid_number.is_empty()
            && !self.gid_number.is_empty()
            && !self.home_directory.is_empty()
            && !self.login_shell.is_empty()
            && self.login_shell != DISABLED_SHELL
    }

    /// Project onto the fields compared by the conflict scan.
    pub fn identity(&self) -> NormalizedIdentity {
        NormalizedIdentity::new(
            &self.distinguished_name,
            &self.login_name,
            &self.uid_number,
        )
    }
}

/// A Unix-enabled Active Directory group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnixGroup {
    /// Directory distinguished name
    pub distinguished_name: String,
    /// Unix group name
    pub name: String,
    /// GID number
    pub gid_number: String,
}

impl UnixGroup {
    /// A group is Unix-enabled when it has both a name and a GID.
    pub fn is_unix_enabled(&self) -> bool {
        !self.name.is_empty() && !self.gid_number.is_empty()
    }

    /// Project onto the fields compared by the conflict scan.
    pub fn identity(&self) -> NormalizedIdentity {
        NormalizedIdentity::new(&self.distinguished_name, &self.name, &self.gid_number)
    }
}
