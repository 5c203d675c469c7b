//! Integration tests for error handling and edge cases.

use std::os::unix::fs::PermissionsExt;
use std::time::Duration;
use tempfile::TempDir;
use wkpdf::config::{Config, OverwriteMode};
use wkpdf::document::Document;
use wkpdf::error::WkPdfError;
use wkpdf::process::{Executable, RenderPipeline};
use wkpdf::source::Source;
use wkpdf::validation::Validator;

use crate::common::Harness;

#[test]
fn test_error_missing_executable() {
    let dir = TempDir::new().unwrap();
    let err = Executable::resolve(dir.path().join("wkhtmltopdf")).unwrap_err();

    assert!(matches!(err, WkPdfError::ExecutableNotFound { .. }));
    assert!(err.is_fatal());
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_error_program_not_on_path() {
    let err = Executable::resolve("wkpdf-test-no-such-program").unwrap_err();
    assert!(matches!(err, WkPdfError::ExecutableNotFound { .. }));
}

#[test]
fn test_error_not_executable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wkhtmltopdf");
    std::fs::write(&path, "#!/bin/sh\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

    let err = Executable::resolve(&path).unwrap_err();
    assert!(matches!(err, WkPdfError::ExecutableNotExecutable { .. }));
}

#[test]
fn test_error_directory_is_not_executable() {
    let dir = TempDir::new().unwrap();
    assert!(Executable::resolve(dir.path()).is_err());
}

#[test]
fn test_error_missing_source_file() {
    let harness = Harness::fake();
    let err = Document::from_file(harness.executable(), harness.dir().join("missing.html"))
        .unwrap_err();
    assert!(matches!(err, WkPdfError::SourceNotFound { .. }));
}

#[test]
fn test_error_source_is_directory() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        Source::file(dir.path()).unwrap_err(),
        WkPdfError::SourceNotFound { .. }
    ));
}

#[tokio::test]
async fn test_error_timeout_in_document() {
    let harness = Harness::new("exec sleep 30\n");
    let mut document = Document::from_html(harness.executable(), "<p>slow</p>")
        .with_pipeline(RenderPipeline::new().with_timeout(Duration::from_millis(100)));

    let err = document.render().await.unwrap_err();
    assert!(matches!(err, WkPdfError::Timeout { .. }));
    assert_eq!(err.exit_code(), 124);
    assert!(!document.is_rendered());
}

#[tokio::test]
async fn test_error_no_clobber() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.pdf");
    std::fs::write(&output, b"existing").unwrap();

    let config = Config {
        input: "<p>x</p>".to_string(),
        output,
        binary: "sh".into(),
        overwrite_mode: OverwriteMode::NoClobber,
        ..Default::default()
    };

    let err = Validator::new().validate_config(&config).await.unwrap_err();
    assert!(matches!(err, WkPdfError::OutputExists { .. }));
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn test_error_unwritable_output_directory() {
    let harness = Harness::fake();
    let mut document = Document::from_html(harness.executable(), "<p>x</p>");

    let err = document
        .save(harness.dir().join("missing").join("out.pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, WkPdfError::FailedToCreateOutput { .. }));
    // The render itself succeeded and stays cached.
    assert!(document.is_rendered());
}
