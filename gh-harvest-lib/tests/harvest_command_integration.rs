//! Integration test for the `harvest` command.
//!
//! Runs the full workflow through [`gh_harvest_lib::run`]: read the input CSV, fetch every
//! user from a wiremock stand-in for the GitHub API, and write the output CSV and error log.

use camino::Utf8PathBuf;
use gh_harvest_lib::Host;
use serde_json::json;
use std::fs;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test host that captures output to in-memory buffers.
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
}

impl TestHost {
    const fn new() -> Self {
        Self {
            output_buf: Vec::new(),
            error_buf: Vec::new(),
        }
    }

    fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl std::io::Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl std::io::Write {
        &mut self.error_buf
    }
}

struct Workspace {
    _dir: tempfile::TempDir,
    input: Utf8PathBuf,
    output: Utf8PathBuf,
    error_log: Utf8PathBuf,
    config: Utf8PathBuf,
}

impl Workspace {
    fn new(input_csv: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir");

        let input = root.join("contributors.csv");
        fs::write(&input, input_csv).expect("write input");

        let config = root.join("gh-harvest.toml");
        fs::write(&config, "max_concurrent_workers = 2\nretry_delay = \"10ms\"\nmax_retries = 1\n").expect("write config");

        Self {
            input,
            output: root.join("profiles.csv"),
            error_log: root.join("errors.txt"),
            config,
            _dir: dir,
        }
    }

    fn args<'a>(&'a self, server_uri: &'a str, token: &'a str) -> Vec<&'a str> {
        vec![
            "gh-harvest",
            "harvest",
            self.input.as_str(),
            self.output.as_str(),
            "--error-log",
            self.error_log.as_str(),
            "--config",
            self.config.as_str(),
            "--github-token",
            token,
            "--api-base-url",
            server_uri,
            "--color",
            "never",
        ]
    }
}

async fn mock_json(server: &MockServer, route: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_harvest_writes_rows_and_error_log() {
    let server = MockServer::start().await;

    mock_json(&server, "/users/alice", 200, json!({ "login": "alice", "name": "Alice", "followers": 3 })).await;
    mock_json(
        &server,
        "/users/alice/repos",
        200,
        json!([
            { "name": "one", "owner": { "login": "alice" }, "stargazers_count": 1 },
            { "name": "two", "owner": { "login": "alice" }, "stargazers_count": 2 }
        ]),
    )
    .await;
    mock_json(&server, "/repos/alice/one/commits", 200, json!([{ "sha": "aaa" }])).await;
    mock_json(&server, "/repos/alice/two/commits", 200, json!([])).await;

    mock_json(&server, "/users/bob", 200, json!({ "login": "bob" })).await;
    mock_json(&server, "/users/bob/repos", 200, json!([])).await;

    mock_json(&server, "/users/ghost", 404, json!({ "message": "Not Found" })).await;

    let ws = Workspace::new("repo,contributor_login\nx,alice\ny,bob\nz,alice\nw,ghost\n");
    let uri = server.uri();

    let mut host = TestHost::new();
    let result = gh_harvest_lib::run(&mut host, ws.args(&uri, "test-token")).await;
    assert!(result.is_ok(), "harvest command failed: {result:?}");

    let mut reader = csv::Reader::from_path(&ws.output).expect("open output");
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(headers.len(), 34);
    assert_eq!(&headers[0], "username");
    assert_eq!(&headers[29], "repoCommitCountFirstPage");

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.expect("record")).collect();
    assert_eq!(records.len(), 3, "two rows for alice and one placeholder row for bob");

    let alice: Vec<_> = records.iter().filter(|r| &r[0] == "alice").collect();
    assert_eq!(alice.len(), 2);
    assert_eq!(&alice[0][15], "one");
    assert_eq!(&alice[0][30], "aaa");
    assert_eq!(&alice[1][15], "two");
    assert_eq!(&alice[1][29], "0");

    let bob: Vec<_> = records.iter().filter(|r| &r[0] == "bob").collect();
    assert_eq!(bob.len(), 1);
    assert_eq!(&bob[0][1], "N/A");
    assert!(bob[0].iter().skip(15).all(|v| v == "N/A"));

    let errors = fs::read_to_string(&ws.error_log).expect("read error log");
    assert_eq!(errors, "ghost: User not found\n");

    let out = host.output_str();
    assert!(out.contains("Processed 3 users: 2 succeeded, 1 failed"), "unexpected output: {out}");
    assert!(out.contains(&format!("Results written to {}", ws.output)));
    assert!(out.contains(&format!("Failures logged to {}", ws.error_log)));
}

#[tokio::test]
async fn test_harvest_empty_input_writes_header_only() {
    let server = MockServer::start().await;
    let ws = Workspace::new("contributor_login\n");
    let uri = server.uri();

    let mut host = TestHost::new();
    let result = gh_harvest_lib::run(&mut host, ws.args(&uri, "test-token")).await;
    assert!(result.is_ok(), "harvest command failed: {result:?}");

    let output = fs::read_to_string(&ws.output).expect("read output");
    assert_eq!(output.lines().count(), 1);
    assert!(output.starts_with("username,"));
    assert!(host.output_str().contains("Processed 0 users: 0 succeeded, 0 failed"));
    assert!(!host.output_str().contains("Failures logged"));
}

#[tokio::test]
async fn test_harvest_requires_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let ws = Workspace::new("contributor_login\nalice\n");
    let uri = server.uri();

    let mut host = TestHost::new();
    let result = gh_harvest_lib::run(&mut host, ws.args(&uri, "")).await;

    assert!(result.is_err());
    assert!(!ws.output.exists(), "no output should be created without a token");
}

#[tokio::test]
async fn test_harvest_missing_login_column_fails() {
    let server = MockServer::start().await;
    let ws = Workspace::new("login\nalice\n");
    let uri = server.uri();

    let mut host = TestHost::new();
    let result = gh_harvest_lib::run(&mut host, ws.args(&uri, "test-token")).await;

    let err = result.expect_err("missing column should fail");
    assert!(format!("{err:#}").contains("contributor_login"));
}
