//! Extraction of Unix identities from Active Directory objects.
//!
//! Directories with native Unix attributes (RFC 2307 / SFU schema) carry each
//! value in its own attribute. Directories without them use the "schemaless"
//! layout, where values are packed into `altSecurityIdentities` as
//! label-prefixed strings:
//!
//! ```text
//! X509:<S>CN=Posix Account<I>CN=Quest Software<DATA>UidNumber: 8085
//! ```
//!
//! Both layouts produce the same [`UnixUser`] / [`UnixGroup`] records.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::identity::{UnixGroup, UnixUser};

/// A directory object as exported by the AD query (attribute name → value).
pub type DirectoryObject = serde_json::Map<String, Value>;

/// Attribute holding the distinguished name.
pub const DISTINGUISHED_NAME: &str = "DistinguishedName";

/// Multi-valued attribute used by the schemaless layout.
pub const ALT_SECURITY_IDENTITIES: &str = "altSecurityIdentities";

const POSIX_ACCOUNT_LABEL: &str = "X509:<S>CN=Posix Account<I>CN=Quest Software<DATA>";
const POSIX_GROUP_LABEL: &str = "X509:<S>CN=Posix Group<I>CN=Quest Software<DATA>";

/// How Unix attributes are stored on the directory objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// One directory attribute per Unix attribute
    Attributes,
    /// Values packed into `altSecurityIdentities`
    Schemaless,
}

impl SchemaKind {
    /// Inspect the first object to decide which layout the export uses.
    ///
    /// Returns `None` when neither layout is recognizable (including an empty
    /// export).
    pub fn detect(objects: &[DirectoryObject], id_attribute: &str) -> Option<Self> {
        let first = objects.first()?;
        if first.contains_key(ALT_SECURITY_IDENTITIES) {
            Some(Self::Schemaless)
        } else if first.contains_key(id_attribute) {
            Some(Self::Attributes)
        } else {
            None
        }
    }
}

/// Attribute names used for users in the native schema layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAttributes {
    /// Login name attribute
    pub login_name: String,
    /// UID number attribute
    pub uid_number: String,
    /// Primary GID number attribute
    pub gid_number: String,
    /// GECOS attribute
    pub gecos: String,
    /// Home directory attribute
    pub home_directory: String,
    /// Login shell attribute
    pub login_shell: String,
}

impl Default for UserAttributes {
    fn default() -> Self {
        Self {
            login_name: "sAMAccountName".to_string(),
            uid_number: "uidNumber".to_string(),
            gid_number: "gidNumber".to_string(),
            gecos: "gecos".to_string(),
            home_directory: "unixHomeDirectory".to_string(),
            login_shell: "loginShell".to_string(),
        }
    }
}

/// Attribute names used for groups in the native schema layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAttributes {
    /// Group name attribute
    pub name: String,
    /// GID number attribute
    pub gid_number: String,
}

impl Default for GroupAttributes {
    fn default() -> Self {
        Self {
            name: "sAMAccountName".to_string(),
            gid_number: "gidNumber".to_string(),
        }
    }
}

/// Parse an exported JSON array of directory objects.
pub fn parse_objects(json: &str) -> Result<Vec<DirectoryObject>> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Object(map) => Ok(map),
            other => Err(Error::Parse {
                index,
                message: format!("expected an object, got {}", json_type(&other)),
            }),
        })
        .collect()
}

/// Extract Unix-enabled users, picking the layout from the objects themselves.
pub fn extract_users(objects: &[DirectoryObject], attrs: &UserAttributes) -> Vec<UnixUser> {
    match SchemaKind::detect(objects, &attrs.uid_number) {
        Some(SchemaKind::Attributes) => users_by_schema(objects, attrs),
        Some(SchemaKind::Schemaless) => users_when_schemaless(objects),
        None => Vec::new(),
    }
}

/// Extract Unix-enabled groups, picking the layout from the objects themselves.
pub fn extract_groups(objects: &[DirectoryObject], attrs: &GroupAttributes) -> Vec<UnixGroup> {
    match SchemaKind::detect(objects, &attrs.gid_number) {
        Some(SchemaKind::Attributes) => groups_by_schema(objects, attrs),
        Some(SchemaKind::Schemaless) => groups_when_schemaless(objects),
        None => Vec::new(),
    }
}

/// Read users from native Unix attributes.
pub fn users_by_schema(objects: &[DirectoryObject], attrs: &UserAttributes) -> Vec<UnixUser> {
    objects
        .iter()
        .map(|object| UnixUser {
            distinguished_name: attribute_text(object, DISTINGUISHED_NAME),
            login_name: attribute_text(object, &attrs.login_name),
            uid_number: attribute_text(object, &attrs.uid_number),
            gid_number: attribute_text(object, &attrs.gid_number),
            gecos: attribute_text(object, &attrs.gecos),
            home_directory: attribute_text(object, &attrs.home_directory),
            login_shell: attribute_text(object, &attrs.login_shell),
        })
        .filter(UnixUser::is_unix_enabled)
        .collect()
}

/// Read users from schemaless `altSecurityIdentities` entries.
pub fn users_when_schemaless(objects: &[DirectoryObject]) -> Vec<UnixUser> {
    objects
        .iter()
        .map(|object| {
            let field = |attr: &str| labeled_value(object, POSIX_ACCOUNT_LABEL, attr);
            UnixUser {
                distinguished_name: attribute_text(object, DISTINGUISHED_NAME),
                login_name: field("LoginName"),
                uid_number: field("UidNumber"),
                gid_number: field("UserGidNumber"),
                gecos: field("Gecos"),
                home_directory: field("HomeDirectory"),
                login_shell: field("LoginShell"),
            }
        })
        .filter(UnixUser::is_unix_enabled)
        .collect()
}

/// Read groups from native Unix attributes.
pub fn groups_by_schema(objects: &[DirectoryObject], attrs: &GroupAttributes) -> Vec<UnixGroup> {
    objects
        .iter()
        .map(|object| UnixGroup {
            distinguished_name: attribute_text(object, DISTINGUISHED_NAME),
            name: attribute_text(object, &attrs.name),
            gid_number: attribute_text(object, &attrs.gid_number),
        })
        .filter(UnixGroup::is_unix_enabled)
        .collect()
}

/// Read groups from schemaless `altSecurityIdentities` entries.
pub fn groups_when_schemaless(objects: &[DirectoryObject]) -> Vec<UnixGroup> {
    objects
        .iter()
        .map(|object| UnixGroup {
            distinguished_name: attribute_text(object, DISTINGUISHED_NAME),
            name: labeled_value(object, POSIX_GROUP_LABEL, "GroupName"),
            gid_number: labeled_value(object, POSIX_GROUP_LABEL, "GroupGidNumber"),
        })
        .filter(UnixGroup::is_unix_enabled)
        .collect()
}

/// Render a scalar attribute as text; anything missing or non-scalar is "".
fn attribute_text(object: &DirectoryObject, attr: &str) -> String {
    match object.get(attr) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Find the first packed entry carrying `<label><attr>:` and return its value.
fn labeled_value(object: &DirectoryObject, label: &str, attr: &str) -> String {
    let Some(Value::Array(entries)) = object.get(ALT_SECURITY_IDENTITIES) else {
        return String::new();
    };

    let prefix = format!("{label}{attr}:");
    entries
        .iter()
        .filter_map(Value::as_str)
        .find_map(|entry| entry.strip_prefix(prefix.as_str()))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn objects(value: Value) -> Vec<DirectoryObject> {
        parse_objects(&value.to_string()).unwrap()
    }

    #[test]
    fn test_detect_schema_kind() {
        let native = objects(json!([{ "uidNumber": 1002 }]));
        assert_eq!(
            SchemaKind::detect(&native, "uidNumber"),
            Some(SchemaKind::Attributes)
        );

        let packed = objects(json!([{ "altSecurityIdentities": [] }]));
        assert_eq!(
            SchemaKind::detect(&packed, "uidNumber"),
            Some(SchemaKind::Schemaless)
        );

        let neither = objects(json!([{ "Name": "x" }]));
        assert_eq!(SchemaKind::detect(&neither, "uidNumber"), None);
        assert_eq!(SchemaKind::detect(&[], "uidNumber"), None);
    }

    #[test]
    fn test_users_by_schema() {
        let objs = objects(json!([
            {
                "DistinguishedName": "CN=fuser,CN=Users,DC=QASDEV,DC=oi",
                "sAMAccountName": "fuser",
                "gecos": ",,,",
                "gidNumber": 1001,
                "loginShell": "/bin/bash",
                "uidNumber": 1002,
                "unixHomeDirectory": "/home/fuser"
            },
            {
                "DistinguishedName": "CN=nologin,CN=Users,DC=QASDEV,DC=oi",
                "sAMAccountName": "nologin",
                "gidNumber": 1001,
                "loginShell": "/bin/false",
                "uidNumber": 1004,
                "unixHomeDirectory": "/home/nologin"
            },
            {
                "DistinguishedName": "CN=nohome,CN=Users,DC=QASDEV,DC=oi",
                "sAMAccountName": "nohome",
                "gidNumber": 1001,
                "loginShell": "/bin/sh",
                "uidNumber": 1005
            }
        ]));

        let users = extract_users(&objs, &UserAttributes::default());
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].login_name, "fuser");
        assert_eq!(users[0].uid_number, "1002");
        assert_eq!(users[0].gid_number, "1001");
        assert_eq!(users[0].home_directory, "/home/fuser");
    }

    #[test]
    fn test_users_when_schemaless() {
        let objs = objects(json!([
            {
                "DistinguishedName": "CN=ssu,OU=smoke,DC=d16,DC=sb",
                "altSecurityIdentities": [
                    "X509:<S>CN=Posix Account<I>CN=Quest Software<DATA>UserGidNumber:1593431050",
                    "X509:<S>CN=Posix Account<I>CN=Quest Software<DATA>UidNumber:446089076",
                    "X509:<S>CN=Posix Account<I>CN=Quest Software<DATA>LoginShell:/bin/sh",
                    "X509:<S>CN=Posix Account<I>CN=Quest Software<DATA>LoginName:ssu",
                    "X509:<S>CN=Posix Account<I>CN=Quest Software<DATA>HomeDirectory:/home/ssu"
                ]
            },
            {
                "DistinguishedName": "CN=partial,OU=smoke,DC=d16,DC=sb",
                "altSecurityIdentities": [
                    "X509:<S>CN=Posix Account<I>CN=Quest Software<DATA>UidNumber: 8085"
                ]
            }
        ]));

        let users = extract_users(&objs, &UserAttributes::default());
        assert_eq!(users.len(), 1);
        let user = &users[0];
        assert_eq!(user.distinguished_name, "CN=ssu,OU=smoke,DC=d16,DC=sb");
        assert_eq!(user.login_name, "ssu");
        assert_eq!(user.uid_number, "446089076");
        assert_eq!(user.gecos, "");
        assert_eq!(user.login_shell, "/bin/sh");
    }

    #[test]
    fn test_schemaless_value_is_trimmed() {
        let objs = objects(json!([{
            "altSecurityIdentities": [
                "X509:<S>CN=Posix Group<I>CN=Quest Software<DATA>GroupName: tg-1974",
                "X509:<S>CN=Posix Group<I>CN=Quest Software<DATA>GroupGidNumber: 8135"
            ]
        }]));

        let groups = extract_groups(&objs, &GroupAttributes::default());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "tg-1974");
        assert_eq!(groups[0].gid_number, "8135");
        assert_eq!(groups[0].distinguished_name, "");
    }

    #[test]
    fn test_empty_labeled_value_is_absent() {
        let objs = objects(json!([{
            "altSecurityIdentities": [
                "X509:<S>CN=Posix Group<I>CN=Quest Software<DATA>GroupName: ",
                "X509:<S>CN=Posix Group<I>CN=Quest Software<DATA>GroupGidNumber: 8135"
            ]
        }]));
        assert!(extract_groups(&objs, &GroupAttributes::default()).is_empty());
    }

    #[test]
    fn test_groups_by_schema_custom_attributes() {
        let objs = objects(json!([
            { "DistinguishedName": "CN=a", "Name": "a", "gidNumber": 10 },
            { "DistinguishedName": "CN=b", "Name": "", "gidNumber": 11 }
        ]));
        let attrs = GroupAttributes {
            name: "Name".to_string(),
            ..GroupAttributes::default()
        };

        let groups = extract_groups(&objs, &attrs);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "a");
        assert_eq!(groups[0].gid_number, "10");
    }

    #[test]
    fn test_parse_objects_rejects_non_objects() {
        let err = parse_objects(r#"[{"a": 1}, "oops"]"#).unwrap_err();
        assert!(matches!(err, Error::Parse { index: 1, .. }));

        assert!(matches!(parse_objects("{}"), Err(Error::Json(_))));
    }
}
