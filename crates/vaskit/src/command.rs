//! Shell command lines.
//!
//! Every command is rendered into a single string for `sh -c`, so the program
//! path and anything user-supplied go through [`quote`]. Caller-provided extra options are the
//! one exception: they are an opaque shell fragment and are appended verbatim.

use std::fmt;
use std::path::{Path, PathBuf};

/// Wrap a value in single quotes for POSIX shells.
///
/// ```
/// assert_eq!(vaskit::command::quote("it's"), r#"'it'"'"'s'"#);
/// ```
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r#"'"'"'"#))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    /// Fixed token, emitted as is
    Flag(String),
    /// User value, quoted
    Value(String),
    /// Credential, quoted and masked in logs
    Secret(String),
    /// Opaque fragment, emitted as is
    Raw(String),
}

/// A program plus arguments, rendered as one shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: PathBuf,
    args: Vec<Arg>,
}

impl CommandLine {
    /// Start a command line for `program`.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// The program being run.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Append a fixed token such as `join` or `-f`.
    #[must_use]
    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.args.push(Arg::Flag(flag.into()));
        self
    }

    /// Append a quoted value.
    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.args.push(Arg::Value(value.into()));
        self
    }

    /// Append `flag` followed by a quoted value.
    #[must_use]
    pub fn option(self, flag: &str, value: impl Into<String>) -> Self {
        self.flag(flag).value(value)
    }

    /// Append `flag` and a quoted value only when the value is non-empty.
    #[must_use]
    pub fn option_if(self, flag: &str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.option(flag, value)
        }
    }

    /// Append `flag` followed by a credential.
    #[must_use]
    pub fn secret(mut self, flag: &str, value: impl Into<String>) -> Self {
        self.args.push(Arg::Flag(flag.to_string()));
        self.args.push(Arg::Secret(value.into()));
        self
    }

    /// Append a verbatim shell fragment. Blank fragments are ignored.
    #[must_use]
    pub fn raw(mut self, fragment: &str) -> Self {
        let fragment = fragment.trim();
        if !fragment.is_empty() {
            self.args.push(Arg::Raw(fragment.to_string()));
        }
        self
    }

    /// Append each value quoted.
    #[must_use]
    pub fn values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(values.into_iter().map(|v| Arg::Value(v.into())));
        self
    }

    /// The string handed to the shell.
    pub fn to_shell_string(&self) -> String {
        self.render(false)
    }

    /// The same string with credentials masked, for logs and errors.
    pub fn redacted(&self) -> String {
        self.render(true)
    }

    fn render(&self, mask: bool) -> String {
        let mut parts = vec![quote(&self.program.to_string_lossy())];
        for arg in &self.args {
            parts.push(match arg {
                Arg::Flag(s) | Arg::Raw(s) => s.clone(),
                Arg::Value(s) => quote(s),
                Arg::Secret(_) if mask => "'****'".to_string(),
                Arg::Secret(s) => quote(s),
            });
        }
        parts.join(" ")
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}
