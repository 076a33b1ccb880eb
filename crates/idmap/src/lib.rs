//! # idmap
//!
//! Unix identity data for hosts joined to an Active Directory domain.
//!
//! This crate is pure data handling, it never runs external commands:
//! - Extracting Unix-enabled users and groups from exported directory
//!   objects, for both the native Unix schema and the "schemaless" layout
//! - Detecting UID/GID collisions between identities
//! - Parsing and filtering local `/etc/passwd` and `/etc/group` content
//! - Regrouping per-host logon policy reports by user
//!
//! ## Example
//!
//! ```
//! use idmap::{NormalizedIdentity, find_conflicts};
//!
//! let ids = [
//!     NormalizedIdentity::new("CN=a,DC=example", "a", "100"),
//!     NormalizedIdentity::new("CN=b,DC=example", "b", "200"),
//!     NormalizedIdentity::new("CN=c,DC=example", "c", "100"),
//! ];
//!
//! let conflicts = find_conflicts(&ids);
//! assert_eq!(conflicts.get("100").map(<[_]>::len), Some(2));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod conflicts;
pub mod error;
pub mod extract;
pub mod identity;
pub mod local;
pub mod policy;

pub use conflicts::{Conflict, ConflictSet, find_conflicts, group_conflicts, user_conflicts};
pub use error::{Error, Result};
pub use extract::{DirectoryObject, GroupAttributes, SchemaKind, UserAttributes};
pub use identity::{NormalizedIdentity, UnixGroup, UnixUser};
pub use local::{GroupEntry, GroupFilter, PasswdEntry};
pub use policy::UserPolicy;
