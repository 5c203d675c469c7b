//! Shared helpers for integration tests.
//!
//! Tests never need a real wkhtmltopdf: each one writes a small shell script
//! that behaves like it on the pipe level (reads HTML, writes bytes, exits).

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wkpdf::process::Executable;

/// Stand-in for wkhtmltopdf.
///
/// Records its arguments (one per line) and increments a call counter,
/// then writes `%PDF-1.4`, the HTML it was given, and `%%EOF` to stdout.
/// The HTML comes from stdin when the input token is `-`, otherwise from
/// the named file.
pub const FAKE_WKHTMLTOPDF: &str = r#"
dir="$(dirname "$0")"
count=$(cat "$dir/calls" 2>/dev/null || echo 0)
echo $((count + 1)) > "$dir/calls"
: > "$dir/args"
prev=""
last=""
for arg in "$@"; do
    printf '%s\n' "$arg" >> "$dir/args"
    prev="$last"
    last="$arg"
done
printf '%%PDF-1.4\n'
if [ "$prev" = "-" ]; then cat; else cat "$prev"; fi
printf '\n%%%%EOF\n'
"#;

/// A directory holding one harness script.
pub struct Harness {
    dir: TempDir,
    script: PathBuf,
}

impl Harness {
    /// Write `body` as an executable `/bin/sh` script.
    pub fn new(body: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let script = dir.path().join("wkhtmltopdf");
        std::fs::write(&script, format!("#!/bin/sh\n{body}")).expect("Failed to write harness");
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make harness executable");
        Self { dir, script }
    }

    /// The fake wkhtmltopdf.
    pub fn fake() -> Self {
        Self::new(FAKE_WKHTMLTOPDF)
    }

    /// Resolved executable for the script.
    pub fn executable(&self) -> Executable {
        Executable::resolve(&self.script).expect("Harness should resolve")
    }

    /// Directory the script lives in.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// How many times the fake was started.
    pub fn calls(&self) -> usize {
        std::fs::read_to_string(self.dir.path().join("calls"))
            .map(|count| count.trim().parse().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Arguments of the most recent call.
    pub fn last_args(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("args"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Bytes the fake produces for `html`.
pub fn fake_pdf(html: &[u8]) -> Vec<u8> {
    let mut pdf = b"%PDF-1.4\n".to_vec();
    pdf.extend_from_slice(html);
    pdf.extend_from_slice(b"\n%%EOF\n");
    pdf
}
