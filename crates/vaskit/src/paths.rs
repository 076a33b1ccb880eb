//! Install locations of the binaries this crate drives.

use std::path::PathBuf;

/// Default vastool location.
pub const VASTOOL_PATH: &str = "/opt/quest/bin/vastool";
/// Default preflight location.
pub const PREFLIGHT_PATH: &str = "/opt/quest/bin/preflight";
/// Default mapped-user lister location.
pub const ASDCOM_PATH: &str = "/opt/quest/libexec/vas/sugi/asdcom";

/// Where to find each binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Join/unjoin and inspection tool
    pub vastool: PathBuf,
    /// Pre-join checker
    pub preflight: PathBuf,
    /// Mapped-user lister
    pub asdcom: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            vastool: PathBuf::from(VASTOOL_PATH),
            preflight: PathBuf::from(PREFLIGHT_PATH),
            asdcom: PathBuf::from(ASDCOM_PATH),
        }
    }
}
