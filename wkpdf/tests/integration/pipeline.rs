//! Integration tests for the subprocess pipeline.

use std::time::{Duration, Instant};
use wkpdf::command::{RenderRequest, Replacements};
use wkpdf::error::WkPdfError;
use wkpdf::process::{OutputLimits, RenderPipeline, RenderResult, StreamKind};
use wkpdf::source::Source;
use wkpdf::switches::Switches;

use crate::common::{Harness, fake_pdf};

fn request(harness: &Harness, source: Source) -> RenderRequest {
    RenderRequest::from_switches(
        harness.executable(),
        &Switches::new(),
        &Replacements::new(),
        source,
    )
}

async fn execute(pipeline: &RenderPipeline, request: &RenderRequest) -> wkpdf::Result<RenderResult> {
    tokio::time::timeout(Duration::from_secs(20), pipeline.execute(request))
        .await
        .expect("render should not hang")
}

#[tokio::test]
async fn test_large_stderr_does_not_deadlock() {
    let harness = Harness::new("head -c 1048576 /dev/zero 1>&2\nprintf '0123456789'\n");
    let request = request(&harness, Source::html("<p>x</p>"));

    let result = execute(&RenderPipeline::new(), &request).await.unwrap();
    assert_eq!(result, RenderResult::Success(b"0123456789".to_vec()));
}

#[tokio::test]
async fn test_large_stderr_kept_on_failure() {
    let harness = Harness::new("head -c 1048576 /dev/zero 1>&2\nexit 2\n");
    let request = request(&harness, Source::html("<p>x</p>"));

    match execute(&RenderPipeline::new(), &request).await.unwrap() {
        RenderResult::Failure { exit_code, stderr } => {
            assert_eq!(exit_code, 2);
            assert_eq!(stderr.len(), 1024 * 1024);
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_large_payload_round_trip() {
    // Larger than any pipe buffer in both directions at once.
    let html: Vec<u8> = b"<p>0123456789abcdef</p>\n"
        .iter()
        .copied()
        .cycle()
        .take(4 * 1024 * 1024)
        .collect();
    let harness = Harness::fake();
    let request = request(&harness, Source::html(html.clone()));

    let result = execute(&RenderPipeline::new(), &request).await.unwrap();
    assert_eq!(result, RenderResult::Success(fake_pdf(&html)));
}

#[tokio::test]
async fn test_empty_payload_closes_stdin() {
    let harness = Harness::new("cat\n");
    let request = request(&harness, Source::html(""));

    let started = Instant::now();
    let result = execute(&RenderPipeline::new(), &request).await.unwrap();

    assert_eq!(result, RenderResult::Success(Vec::new()));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_child_ignoring_stdin() {
    let harness = Harness::new("exec 0<&-\nprintf '%%PDF'\n");
    let html = vec![b'x'; 1024 * 1024];
    let request = request(&harness, Source::html(html));

    let result = execute(&RenderPipeline::new(), &request).await.unwrap();
    assert_eq!(result, RenderResult::Success(b"%PDF".to_vec()));
}

#[tokio::test]
async fn test_exit_code_mapping() {
    let harness = Harness::new("echo boom >&2\nexit 1\n");
    let request = request(&harness, Source::html("<p>x</p>"));

    let result = execute(&RenderPipeline::new(), &request).await.unwrap();
    assert_eq!(
        result,
        RenderResult::Failure {
            exit_code: 1,
            stderr: "boom\n".to_string()
        }
    );

    let err = result.into_pdf().unwrap_err();
    assert_eq!(err.stderr(), Some("boom\n"));
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_file_source_passes_path() {
    let harness = Harness::fake();
    let page = harness.dir().join("page.html");
    std::fs::write(&page, "<p>from file</p>").unwrap();

    let request = request(&harness, Source::file(&page).unwrap());
    let result = execute(&RenderPipeline::new(), &request).await.unwrap();

    assert_eq!(result, RenderResult::Success(fake_pdf(b"<p>from file</p>")));
    let args = harness.last_args();
    assert_eq!(
        args,
        vec![page.canonicalize().unwrap().display().to_string(), "-".to_string()]
    );
}

#[tokio::test]
async fn test_stderr_limit() {
    let harness = Harness::new("head -c 65536 /dev/zero 1>&2\nprintf '%%PDF'\n");
    let request = request(&harness, Source::html("<p>x</p>"));
    let pipeline = RenderPipeline::new().with_limits(OutputLimits {
        stdout: None,
        stderr: Some(1024),
    });

    let err = execute(&pipeline, &request).await.unwrap_err();
    assert!(matches!(
        err,
        WkPdfError::OutputLimitExceeded {
            stream: StreamKind::Stderr,
            limit: 1024
        }
    ));
}

#[tokio::test]
async fn test_timeout_kills_child() {
    let harness = Harness::new("exec sleep 30\n");
    let request = request(&harness, Source::html("<p>x</p>"));
    let pipeline = RenderPipeline::new().with_timeout(Duration::from_millis(200));

    let started = Instant::now();
    let err = execute(&pipeline, &request).await.unwrap_err();

    assert!(matches!(err, WkPdfError::Timeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_concurrent_renders_are_independent() {
    let harness = Harness::new("cat\n");
    let pipeline = RenderPipeline::new();

    let first = request(&harness, Source::html("first"));
    let second = request(&harness, Source::html("second"));
    let (a, b) = tokio::join!(execute(&pipeline, &first), execute(&pipeline, &second));

    assert_eq!(a.unwrap(), RenderResult::Success(b"first".to_vec()));
    assert_eq!(b.unwrap(), RenderResult::Success(b"second".to_vec()));
}
