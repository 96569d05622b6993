//! End-to-end tests for the `vista` binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ANSWER: &str = "```yaml
title: Lighthouse at Dawn
description: |
  A white lighthouse in #fog.
descriptive_tags:
  - lighthouse
  - fog
social_media_tags:
  - MistyMystery
location: Vik, Iceland
```
";

/// A `vista` command isolated from the user's home directory and environment.
fn vista(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vista").expect("binary builds");
    cmd.env("HOME", home)
        .env_remove("OPENAI_API_KEY")
        .env_remove("VISTA_MODEL")
        .env_remove("VISTA_API_URL")
        .env_remove("VISTA_CHUNK_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

fn write_answer(dir: &TempDir) -> std::path::PathBuf {
    let file = dir.path().join("answer.md");
    std::fs::write(&file, ANSWER).expect("write answer");
    file
}

#[test]
fn replay_prints_final_card() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_answer(&dir);

    vista(dir.path())
        .args(["replay", "--chunk-size", "5"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Lighthouse at Dawn"))
        .stdout(predicate::str::contains("[lighthouse] [fog] <MistyMystery>"))
        .stdout(predicate::str::contains("A white lighthouse in #fog."))
        .stdout(predicate::str::contains("card updates from"));
}

#[test]
fn replay_writes_html() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_answer(&dir);
    let html = dir.path().join("card.html");

    vista(dir.path())
        .arg("replay")
        .arg(&file)
        .arg("--html")
        .arg(&html)
        .assert()
        .success();

    let written = std::fs::read_to_string(&html).expect("html written");
    assert!(written.contains("<span class=\"badge bg-primary\">MistyMystery</span>"));
    assert!(written.contains("Lighthouse at Dawn"));
}

#[test]
fn replay_missing_file_fails() {
    let dir = TempDir::new().expect("tempdir");

    vista(dir.path())
        .args(["replay", "does-not-exist.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn replay_rejects_zero_chunk_size() {
    let dir = TempDir::new().expect("tempdir");
    let file = write_answer(&dir);

    vista(dir.path())
        .args(["replay", "--chunk-size", "0"])
        .arg(&file)
        .assert()
        .failure();
}

#[test]
fn describe_without_api_key_fails() {
    let dir = TempDir::new().expect("tempdir");

    vista(dir.path())
        .args(["describe", "--url", "https://example.com/a.jpg"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().expect("tempdir");
    let config = dir.path().join("vista.toml");
    std::fs::write(&config, "[stream]\nchunk_timeout_secs = 0\n").expect("write config");

    vista(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["replay", "x.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stream.chunk_timeout_secs"));
}

#[tokio::test(flavor = "multi_thread")]
async fn describe_streams_from_compatible_server() {
    let server = MockServer::start().await;
    let mut body = String::new();
    for chunk in ["```yaml\\n", "title: Harbour\\n", "process: Digital\\n", "```\\n"] {
        body.push_str(&format!(
            "data: {{\"choices\":[{{\"index\":0,\"delta\":{{\"content\":\"{chunk}\"}}}}]}}\n\n"
        ));
    }
    body.push_str(
        "data: {\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\ndata: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().expect("tempdir");
    let html = dir.path().join("card.html");
    let api_url = format!("{}/v1", server.uri());
    let home = dir.path().to_path_buf();
    let html_arg = html.clone();

    let assert = tokio::task::spawn_blocking(move || {
        vista(&home)
            .env("VISTA_API_URL", api_url)
            .args(["describe", "--url", "https://example.com/harbour.jpg", "--no-tools"])
            .arg("--html")
            .arg(&html_arg)
            .write_stdin("")
            .assert()
    })
    .await
    .expect("command runs");

    assert
        .success()
        .stdout(predicate::str::contains("title: Harbour"))
        .stdout(predicate::str::contains("Harbour\n======="))
        .stdout(predicate::str::contains("Process:\n  Digital"));

    let written = std::fs::read_to_string(&html).expect("html written");
    assert!(written.contains("Harbour"));
}
