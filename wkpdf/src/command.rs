//! Command-line construction for wkhtmltopdf.
//!
//! Turns an option set and the header/footer replacement map into the
//! ordered token list
//!
//! ```text
//! <executable> [--<switch> [<value>]]... [--replace <key> <value>]... <input> -
//! ```
//!
//! The argument vector handed to the operating system is never passed
//! through a shell, so values are kept verbatim there. The textual form
//! returned by [`RenderRequest::command_line`] quotes every value with POSIX
//! single quotes so it can be pasted into a shell and split back into the
//! exact same tokens.

use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use crate::process::Executable;
use crate::source::{STDIO_TOKEN, Source};
use crate::switches::{SwitchValue, Switches};

/// Header/footer text replacements (`--replace <key> <value>`).
pub type Replacements = BTreeMap<String, String>;

/// One argument token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Argument {
    /// A `--name` switch token.
    Switch(String),
    /// A value token following a switch.
    Value(String),
}

impl Argument {
    /// Raw token text.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Switch(token) | Self::Value(token) => token,
        }
    }

    /// Token as it appears in a shell command line.
    pub fn to_shell(&self) -> String {
        match self {
            Self::Switch(token) => token.clone(),
            Self::Value(value) => shell_quote(value),
        }
    }
}

/// Serialize switches and replacements into argument tokens.
///
/// `Flag(true)` emits `--name`; `Flag(false)` and `Absent` emit nothing;
/// any other value emits `--name` followed by the value. Every replacement
/// emits `--replace key value`, including empty values.
pub fn serialize_arguments(switches: &Switches, replacements: &Replacements) -> Vec<Argument> {
    let mut arguments = Vec::with_capacity(switches.len() * 2 + replacements.len() * 3);

    for (name, value) in switches {
        match value {
            SwitchValue::Flag(true) => arguments.push(Argument::Switch(format!("--{name}"))),
            SwitchValue::Value(value) => {
                arguments.push(Argument::Switch(format!("--{name}")));
                arguments.push(Argument::Value(value.clone()));
            }
            SwitchValue::Flag(false) | SwitchValue::Absent => {}
        }
    }

    for (key, value) in replacements {
        arguments.push(Argument::Switch("--replace".to_string()));
        arguments.push(Argument::Value(key.clone()));
        arguments.push(Argument::Value(value.clone()));
    }

    arguments
}

/// Quote a string for a POSIX shell.
///
/// The whole string is wrapped in single quotes; embedded single quotes
/// become `'\''`.
///
/// ```
/// use wkpdf::command::shell_quote;
///
/// assert_eq!(shell_quote("A4"), "'A4'");
/// assert_eq!(shell_quote("it's"), r"'it'\''s'");
/// ```
pub fn shell_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Quote a string only if a shell would otherwise split or expand it.
fn shell_quote_if_needed(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "-_./=:,+@%".contains(ch));

    if safe {
        value.to_string()
    } else {
        shell_quote(value)
    }
}

/// Fully resolved invocation of wkhtmltopdf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    executable: Executable,
    arguments: Vec<Argument>,
    source: Source,
}

impl RenderRequest {
    /// Create a request from already serialized arguments.
    pub fn new(executable: Executable, arguments: Vec<Argument>, source: Source) -> Self {
        Self {
            executable,
            arguments,
            source,
        }
    }

    /// Create a request by serializing an option set and replacement map.
    pub fn from_switches(
        executable: Executable,
        switches: &Switches,
        replacements: &Replacements,
        source: Source,
    ) -> Self {
        Self::new(
            executable,
            serialize_arguments(switches, replacements),
            source,
        )
    }

    /// Path of the executable.
    pub fn executable(&self) -> &Path {
        self.executable.path()
    }

    /// Switch and replacement tokens.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// HTML input.
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Bytes written to the child's stdin, if any.
    pub fn payload(&self) -> Option<&[u8]> {
        self.source.payload()
    }

    /// Arguments passed to the executable: switches, input token, output token.
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv: Vec<OsString> = self
            .arguments
            .iter()
            .map(|argument| OsString::from(argument.as_str()))
            .collect();
        argv.push(self.source.token());
        argv.push(OsString::from(STDIO_TOKEN));
        argv
    }

    /// Every token of the invocation, starting with the executable.
    pub fn tokens(&self) -> Vec<OsString> {
        let mut tokens = vec![self.executable.path().as_os_str().to_os_string()];
        tokens.extend(self.argv());
        tokens
    }

    /// Shell-escaped command line, suitable for logs and dry runs.
    pub fn command_line(&self) -> String {
        let mut parts = Vec::with_capacity(self.arguments.len() + 3);
        parts.push(shell_quote_if_needed(
            &self.executable.path().to_string_lossy(),
        ));
        parts.extend(self.arguments.iter().map(Argument::to_shell));
        parts.push(shell_quote_if_needed(&self.source.token().to_string_lossy()));
        parts.push(STDIO_TOKEN.to_string());
        parts.join(" ")
    }

    /// Serializable summary of the invocation.
    pub fn preview(&self) -> CommandPreview {
        CommandPreview {
            program: self.executable.path().display().to_string(),
            arguments: self
                .argv()
                .iter()
                .map(|token| token.to_string_lossy().into_owned())
                .collect(),
            command_line: self.command_line(),
            stdin_bytes: self.payload().map(<[u8]>::len),
        }
    }
}

/// Serializable description of a render invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandPreview {
    /// Executable path.
    pub program: String,
    /// Arguments after the executable.
    pub arguments: Vec<String>,
    /// Shell-escaped command line.
    pub command_line: String,
    /// Size of the stdin payload, if the source is inline HTML.
    pub stdin_bytes: Option<usize>,
}
