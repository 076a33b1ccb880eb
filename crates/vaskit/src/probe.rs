//! Binary presence, permission and version checks.

use regex::Regex;
use std::ffi::CString;
use std::path::Path;
use std::sync::LazyLock;

use crate::command::CommandLine;
use crate::error::{Error, Result};
use crate::runner::Runner;
use crate::types::Version;

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\d+\.\d+[.-]\d+").expect("valid regex"));

/// Fail unless `path` is a regular file the caller may execute.
pub fn ensure_executable(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    if !can_execute(path) {
        return Err(Error::NotExecutable(path.to_path_buf()));
    }
    Ok(())
}

fn can_execute(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };

    // SAFETY: c_path is a valid NUL-terminated string that outlives the call.
    unsafe { libc::access(c_path.as_ptr(), libc::X_OK) == 0 }
}

/// Extract a four-part version from banner text, normalizing `-` to `.`.
pub fn parse_version(output: &str) -> Option<Version> {
    VERSION
        .find(output)
        .map(|m| Version(m.as_str().replace('-', ".")))
}

/// Check `path` and ask it for its version.
///
/// An empty `flag` runs the binary bare.
pub fn probe(runner: &dyn Runner, path: &Path, flag: &str) -> Result<Version> {
    ensure_executable(path)?;

    let result = runner.run(&CommandLine::new(path).raw(flag))?;
    let version =
        parse_version(&result.output).ok_or_else(|| Error::VersionNotFound(path.to_path_buf()))?;

    log::debug!("{} version {version}", path.display());
    Ok(version)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Create an empty file with the given mode.
    pub fn binary(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::binary;
    use super::*;
    use crate::error::ErrorKind;
    use crate::runner::scripted::ScriptedRunner;

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("vastool: QAS 5.1.5.23034").unwrap().as_str(),
            "5.1.5.23034"
        );
        assert_eq!(
            parse_version("Version 4.1.0-21880 built").unwrap().as_str(),
            "4.1.0.21880"
        );
        assert!(parse_version("version 4.1").is_none());
    }

    #[test]
    fn test_probe_missing_binary() {
        let runner = ScriptedRunner::new();
        let err = probe(&runner, Path::new("/nonexistent/vastool"), "-v").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_probe_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = probe(&ScriptedRunner::new(), dir.path(), "-v").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_probe_not_executable() {
        // Root bypasses permission bits
        if unsafe { libc::geteuid() } == 0 {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = binary(dir.path(), "vastool", 0o644);
        let runner = ScriptedRunner::new();
        let err = probe(&runner, &path, "-v").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotExecutable);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_probe_reads_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = binary(dir.path(), "vastool", 0o755);
        let runner = ScriptedRunner::new().reply("vastool' -v", 0, "vastool: QAS 5.1.5-23034\n");

        let version = probe(&runner, &path, "-v").unwrap();
        assert_eq!(version.as_str(), "5.1.5.23034");
    }

    #[test]
    fn test_version_of_binary_under_spaced_directory() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin_dir = dir.path().join("quest tools");
        std::fs::create_dir(&bin_dir).unwrap();
        let path = bin_dir.join("vastool");
        std::fs::write(&path, "#!/bin/sh\necho \"vastool: QAS 5.1.5.23034\"\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let version = probe(&crate::runner::ShellRunner::new(), &path, "-v").unwrap();
        assert_eq!(version.as_str(), "5.1.5.23034");
    }

    #[test]
    fn test_probe_without_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = binary(dir.path(), "vastool", 0o755);
        let runner = ScriptedRunner::new().reply("vastool", 0, "usage: vastool ...");

        let err = probe(&runner, &path, "-v").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionNotFound);
    }
}
