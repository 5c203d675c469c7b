//! Integration tests for the document builder against a fake wkhtmltopdf.

use std::process::Command;
use wkpdf::config::{Margins, Orientation};
use wkpdf::document::Document;
use wkpdf::error::WkPdfError;

use crate::common::{Harness, fake_pdf};

#[tokio::test]
async fn test_render_is_cached_until_mutation() {
    let harness = Harness::fake();
    let mut document = Document::from_html(harness.executable(), "<p>cached</p>");

    let first = document.render().await.unwrap().to_vec();
    let second = document.render().await.unwrap().to_vec();
    assert_eq!(first, second);
    assert_eq!(first, fake_pdf(b"<p>cached</p>"));
    assert_eq!(harness.calls(), 1);
    assert!(document.is_rendered());

    document.set("grayscale", true);
    assert!(!document.is_rendered());
    document.render().await.unwrap();
    assert_eq!(harness.calls(), 2);

    document.replace("section", Some("Intro"));
    document.render().await.unwrap();
    assert_eq!(harness.calls(), 3);

    document.header().center("[section]").end();
    document.render().await.unwrap();
    document.render().await.unwrap();
    assert_eq!(harness.calls(), 4);

    document.set_html("<p>changed</p>");
    let changed = document.render().await.unwrap().to_vec();
    assert_eq!(changed, fake_pdf(b"<p>changed</p>"));
    assert_eq!(harness.calls(), 5);

    document.remove("grayscale");
    document.render().await.unwrap();
    assert_eq!(harness.calls(), 6);
}

#[tokio::test]
async fn test_default_arguments() {
    let harness = Harness::fake();
    let mut document = Document::from_html(harness.executable(), "<p>defaults</p>");
    document.render().await.unwrap();

    assert_eq!(
        harness.last_args(),
        vec![
            "--disable-javascript",
            "--dpi",
            "300",
            "--encoding",
            "utf-8",
            "--margin-bottom",
            "18mm",
            "--margin-left",
            "18mm",
            "--margin-right",
            "18mm",
            "--margin-top",
            "18mm",
            "--no-outline",
            "-",
            "-",
        ]
    );
}

#[tokio::test]
async fn test_builder_arguments() {
    let harness = Harness::fake();
    let mut document = Document::from_html(harness.executable(), "<p>built</p>");
    document
        .margins(&Margins::parse("5 10").unwrap())
        .orientation(Orientation::Landscape)
        .outline(true)
        .set("disableJavascript", false)
        .footer()
        .right("[page]")
        .line(true)
        .end()
        .replace("empty", Some(""));
    document.render().await.unwrap();

    let args = harness.last_args();
    let position = |token: &str| args.iter().position(|arg| arg == token);

    assert_eq!(position("--disable-javascript"), None);
    assert_eq!(position("--no-outline"), None);
    assert!(position("--outline").is_some());
    assert!(position("--footer-line").is_some());

    let margin_top = position("--margin-top").unwrap();
    assert_eq!(args[margin_top + 1], "5mm");
    let margin_left = position("--margin-left").unwrap();
    assert_eq!(args[margin_left + 1], "10mm");

    let orientation = position("--orientation").unwrap();
    assert_eq!(args[orientation + 1], "Landscape");

    let replace = position("--replace").unwrap();
    assert_eq!(&args[replace..], ["--replace", "empty", "", "-", "-"]);
}

#[tokio::test]
async fn test_hostile_values_reach_child_verbatim() {
    let harness = Harness::fake();
    let hostile = [
        "it's; rm -rf / #",
        "$(touch pwned)",
        "`id` && echo \"quoted\"",
        "--dpi",
    ];

    let mut document = Document::from_html(harness.executable(), "<p>x</p>");
    document.title(Some(hostile[0]));
    document.replace("a", Some(hostile[1]));
    document.replace("b", Some(hostile[2]));
    document.replace("c", Some(hostile[3]));
    document.render().await.unwrap();

    let args = harness.last_args();
    for value in hostile {
        assert!(args.iter().any(|arg| arg == value), "missing {value:?}");
    }
    assert!(!harness.dir().join("pwned").exists());
}

#[tokio::test]
async fn test_command_line_splits_back_into_tokens() {
    let harness = Harness::fake();
    let mut document = Document::from_html(harness.executable(), "<p>x</p>");
    document
        .title(Some("Tom's \"report\" $HOME `date` \\ end"))
        .replace("empty", Some(""))
        .replace("spaced", Some("  two  spaces "));

    let request = document.request().unwrap();
    let script = format!("set -- {}\nfor arg in \"$@\"; do printf '%s\\n' \"$arg\"; done", request.command_line());
    let output = Command::new("/bin/sh").arg("-c").arg(script).output().unwrap();
    assert!(output.status.success());

    let split: Vec<String> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    let expected: Vec<String> = request
        .tokens()
        .iter()
        .map(|token| token.to_string_lossy().into_owned())
        .collect();
    assert_eq!(split, expected);
}

#[tokio::test]
async fn test_render_file_source() {
    let harness = Harness::fake();
    let page = harness.dir().join("page.html");
    std::fs::write(&page, "<p>from disk</p>").unwrap();

    let mut document = Document::from_file(harness.executable(), &page).unwrap();
    let pdf = document.render().await.unwrap();
    assert_eq!(pdf, fake_pdf(b"<p>from disk</p>").as_slice());
}

#[tokio::test]
async fn test_save_writes_pdf() {
    let harness = Harness::fake();
    let output = harness.dir().join("out.pdf");

    let mut document = Document::from_html(harness.executable(), "<p>saved</p>");
    let stats = document.save(&output).await.unwrap();

    assert_eq!(std::fs::read(&output).unwrap(), fake_pdf(b"<p>saved</p>"));
    assert_eq!(stats.file_size, fake_pdf(b"<p>saved</p>").len() as u64);
    assert_eq!(harness.calls(), 1);

    document.save(&output).await.unwrap();
    assert_eq!(harness.calls(), 1);
}

#[tokio::test]
async fn test_failed_render_is_not_cached() {
    let harness = Harness::new("echo 'Exit with code 1 due to network error: HostNotFoundError' >&2\nexit 1\n");
    let mut document = Document::from_html(harness.executable(), "<img src=\"http://x.invalid\">");

    let err = document.render().await.unwrap_err();
    match &err {
        WkPdfError::RenderFailed { exit_code, stderr } => {
            assert_eq!(*exit_code, 1);
            assert!(stderr.contains("HostNotFoundError"));
        }
        other => panic!("expected render failure, got {other:?}"),
    }
    assert!(!document.is_rendered());
}

#[tokio::test]
async fn test_render_without_source() {
    let harness = Harness::fake();
    let mut document = Document::new(harness.executable());

    let err = document.render().await.unwrap_err();
    assert!(matches!(err, WkPdfError::MissingSource));
    assert_eq!(harness.calls(), 0);
}

#[tokio::test]
async fn test_css_and_header_temp_files_survive_until_render() {
    let harness = Harness::new(
        "for arg in \"$@\"; do case \"$arg\" in /*.css|/*.html) cat \"$arg\";; esac; done\n",
    );
    let mut document = Document::from_html(harness.executable(), "<p>x</p>");
    document.css_string("p { color: red }", None, true).unwrap();
    document
        .header()
        .html_string("<div>header</div>", false, None)
        .unwrap()
        .end();

    let pdf = document.render().await.unwrap();
    let text = String::from_utf8_lossy(pdf);
    assert!(text.contains("p { color: red }"));
    assert!(text.contains("<div>header</div>"));
}
