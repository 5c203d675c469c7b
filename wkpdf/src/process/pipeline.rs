//! Running wkhtmltopdf and collecting its output.
//!
//! A render spawns one child with three pipes. The HTML payload is written
//! to stdin while stdout and stderr are drained concurrently, so the child
//! can never block on a full pipe that nobody is reading. Stdin is closed as
//! soon as the payload has been written (or the write failed), which is the
//! signal for wkhtmltopdf to start converting. Once both output streams have
//! reached EOF the exit status is collected and mapped to a
//! [`RenderResult`].

use std::fmt;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::time;
use tracing::{debug, warn};

use super::state::{RenderState, StateTracker};
use crate::command::RenderRequest;
use crate::error::{Result, WkPdfError};

/// Size of a single read from an output pipe.
const READ_CHUNK: usize = 16 * 1024;

/// One of the child's output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    /// Standard output (the PDF).
    Stdout,
    /// Standard error (diagnostics).
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Upper bounds on how much output is buffered per stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputLimits {
    /// Maximum PDF size in bytes, `None` for unbounded.
    pub stdout: Option<usize>,
    /// Maximum diagnostic text in bytes, `None` for unbounded.
    pub stderr: Option<usize>,
}

impl OutputLimits {
    /// Default bound for stdout: 512 MiB.
    pub const DEFAULT_STDOUT: usize = 512 * 1024 * 1024;

    /// Default bound for stderr: 16 MiB.
    pub const DEFAULT_STDERR: usize = 16 * 1024 * 1024;

    /// No bounds at all.
    pub fn unbounded() -> Self {
        Self {
            stdout: None,
            stderr: None,
        }
    }

    fn for_stream(&self, stream: StreamKind) -> Option<usize> {
        match stream {
            StreamKind::Stdout => self.stdout,
            StreamKind::Stderr => self.stderr,
        }
    }
}

impl Default for OutputLimits {
    fn default() -> Self {
        Self {
            stdout: Some(Self::DEFAULT_STDOUT),
            stderr: Some(Self::DEFAULT_STDERR),
        }
    }
}

/// Outcome of a render whose child ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderResult {
    /// Exit status zero; holds everything written to stdout.
    Success(Vec<u8>),
    /// Non-zero exit status.
    Failure {
        /// Exit code (`128 + signal` for a child killed by a signal on Unix).
        exit_code: i32,
        /// Everything written to stderr.
        stderr: String,
    },
}

impl RenderResult {
    /// Whether the child exited successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Take the PDF bytes, turning a failure into `WkPdfError::RenderFailed`.
    pub fn into_pdf(self) -> Result<Vec<u8>> {
        match self {
            Self::Success(pdf) => Ok(pdf),
            Self::Failure { exit_code, stderr } => Err(WkPdfError::render_failed(exit_code, stderr)),
        }
    }
}

/// Runs render requests.
///
/// The pipeline itself is stateless; each call to [`execute`](Self::execute)
/// owns its child process and pipes exclusively, so one pipeline can serve
/// concurrent renders.
#[derive(Debug, Clone, Default)]
pub struct RenderPipeline {
    timeout: Option<Duration>,
    limits: OutputLimits,
}

impl RenderPipeline {
    /// Create a pipeline without timeout and with default output limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the child and fail with `Timeout` if a render takes longer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replace the output limits.
    pub fn with_limits(mut self, limits: OutputLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Configured output limits.
    pub fn limits(&self) -> OutputLimits {
        self.limits
    }

    /// Run a request to completion.
    ///
    /// # Errors
    ///
    /// A child that ran and exited non-zero is not an error: it yields
    /// `Ok(RenderResult::Failure { .. })`. Errors are returned when the
    /// child cannot be spawned, its pipes cannot be read, it exceeds the
    /// timeout or an output limit (the child is killed first in both cases).
    pub async fn execute(&self, request: &RenderRequest) -> Result<RenderResult> {
        let mut state = StateTracker::new();
        let program = request.executable();
        let started = Instant::now();

        let mut child = Command::new(program)
            .args(request.argv())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| WkPdfError::ProcessSpawn {
                path: program.to_path_buf(),
                source,
            })?;
        state.advance(RenderState::Spawned);

        debug!(
            program = %program.display(),
            pid = child.id(),
            stdin_bytes = request.payload().map_or(0, <[u8]>::len),
            "spawned wkhtmltopdf"
        );

        let communication = self.communicate(&mut child, request.payload(), &mut state);

        let outcome = match self.timeout {
            Some(limit) => match time::timeout(limit, communication).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(timeout = ?limit, "wkhtmltopdf timed out, terminating");
                    terminate(&mut child).await;
                    return Err(WkPdfError::Timeout { timeout: limit });
                }
            },
            None => communication.await,
        };

        let (status, stdout, stderr) = match outcome {
            Ok(collected) => collected,
            Err(err) => {
                warn!(error = %err, "render aborted, terminating wkhtmltopdf");
                terminate(&mut child).await;
                return Err(err);
            }
        };

        let elapsed = started.elapsed();

        if status.success() {
            state.advance(RenderState::Succeeded);
            if !stderr.is_empty() {
                debug!(stderr = %String::from_utf8_lossy(&stderr), "wkhtmltopdf diagnostics");
            }
            debug!(bytes = stdout.len(), ?elapsed, state = %state.state(), "render succeeded");
            Ok(RenderResult::Success(stdout))
        } else {
            state.advance(RenderState::Failed);
            let exit_code = exit_code(status);
            debug!(exit_code, ?elapsed, state = %state.state(), "render failed");
            Ok(RenderResult::Failure {
                exit_code,
                stderr: String::from_utf8_lossy(&stderr).into_owned(),
            })
        }
    }

    /// Feed stdin, drain both output streams, then reap the child.
    async fn communicate(
        &self,
        child: &mut Child,
        payload: Option<&[u8]>,
        state: &mut StateTracker,
    ) -> Result<(ExitStatus, Vec<u8>, Vec<u8>)> {
        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| WkPdfError::other("wkhtmltopdf stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| WkPdfError::other("wkhtmltopdf stderr was not captured"))?;

        state.advance(RenderState::StreamsDraining);

        let (_, stdout, stderr) = tokio::try_join!(
            async {
                feed_stdin(stdin, payload).await;
                Ok::<_, WkPdfError>(())
            },
            drain(stdout, StreamKind::Stdout, self.limits.for_stream(StreamKind::Stdout)),
            drain(stderr, StreamKind::Stderr, self.limits.for_stream(StreamKind::Stderr)),
        )?;

        let status = child.wait().await?;
        state.advance(RenderState::ChildExited);

        Ok((status, stdout, stderr))
    }
}

/// Write the payload and close stdin.
///
/// Write failures are logged and otherwise ignored: the child may exit
/// before consuming its input, and its exit status tells the real story.
async fn feed_stdin(stdin: Option<ChildStdin>, payload: Option<&[u8]>) {
    let Some(mut stdin) = stdin else {
        return;
    };

    if let Some(payload) = payload
        && !payload.is_empty()
    {
        let written = match stdin.write_all(payload).await {
            Ok(()) => stdin.flush().await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            warn!(error = %err, bytes = payload.len(), "failed to write HTML to wkhtmltopdf");
        }
    }

    // Dropping the handle closes the pipe; the child sees EOF.
    drop(stdin);
}

/// Read a stream to EOF, failing once more than `limit` bytes arrive.
async fn drain<R>(mut reader: R, stream: StreamKind, limit: Option<usize>) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut collected = Vec::new();
    let mut chunk = vec![0u8; READ_CHUNK];

    loop {
        let read = reader
            .read(&mut chunk)
            .await
            .map_err(|source| WkPdfError::StreamRead { stream, source })?;

        if read == 0 {
            return Ok(collected);
        }

        if let Some(limit) = limit
            && collected.len() + read > limit
        {
            return Err(WkPdfError::OutputLimitExceeded { stream, limit });
        }

        collected.extend_from_slice(&chunk[..read]);
    }
}

/// Kill the child and wait for it so no zombie is left behind.
async fn terminate(child: &mut Child) {
    if let Err(err) = child.kill().await {
        warn!(error = %err, "failed to terminate wkhtmltopdf");
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
