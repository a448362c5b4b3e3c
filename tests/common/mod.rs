//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use octocrab::Octocrab;
use serde_json::{Value, json};
use wiremock::{MockServer, ResponseTemplate};

pub const OWNER: &str = "octo-org";
pub const REPO: &str = "hello-world";
pub const HEAD_SHA: &str = "6dcb09b5b57875f334f61aebed695e2e4193db5e";
pub const BASE_SHA: &str = "0a1b2c3d4e5f60718293a4b5c6d7e8f901234567";

/// Helper to create an octocrab client pointing to a mock server.
pub async fn mock_client(server: &MockServer) -> Octocrab {
    Octocrab::builder()
        .base_uri(server.uri())
        .expect("Failed to set base URI")
        .build()
        .expect("Failed to build octocrab")
}

/// A GitHub API error response.
pub fn github_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest"
    }))
}

/// One entry of a commit or compare response's `files` array.
pub fn changed_file(filename: &str, status: &str, additions: u64, deletions: u64) -> Value {
    json!({
        "sha": "bbcd538c8e72b8c175046e27cc8f907076331401",
        "filename": filename,
        "status": status,
        "additions": additions,
        "deletions": deletions,
        "changes": additions + deletions,
        "blob_url": format!("https://github.com/{OWNER}/{REPO}/blob/{HEAD_SHA}/{filename}"),
        "patch": "@@ -1,2 +1,3 @@\n line\n-old\n+new\n+more"
    })
}

/// A commit object as returned by `GET /repos/{owner}/{repo}/commits/{sha}`.
pub fn commit_json(sha: &str, parents: &[&str], files: Vec<Value>) -> Value {
    json!({
        "sha": sha,
        "node_id": "C_kwDOAAAB",
        "commit": {
            "message": "Add parser",
            "author": {"name": "Octo Cat", "email": "octo@example.com", "date": "2024-03-09T14:05:30Z"},
            "committer": {"name": "Octo Cat", "email": "octo@example.com", "date": "2024-03-09T14:05:30Z"}
        },
        "parents": parents.iter().map(|p| json!({"sha": p, "url": "https://api.github.com"})).collect::<Vec<_>>(),
        "stats": {"additions": 0, "deletions": 0, "total": 0},
        "files": files
    })
}

/// A contents API file response.
pub fn contents_json(path: &str, content: &str, sha: &str) -> Value {
    json!({
        "type": "file",
        "encoding": "base64",
        "name": path,
        "path": path,
        "sha": sha,
        "size": content.len(),
        "content": STANDARD.encode(content)
    })
}

/// A contents API PUT response.
pub fn put_contents_response(path: &str) -> Value {
    json!({
        "content": {"name": path, "path": path, "sha": "95b966ae1c166bd92f8ae7d1c313e738c731dfc3"},
        "commit": {"sha": "7638417db6d59f3c431d3e1f261cc637155684cd", "message": "Append analysis"}
    })
}

/// Decode the base64 `content` field of a recorded PUT request body.
pub fn decoded_put_content(body: &[u8]) -> String {
    let json: Value = serde_json::from_slice(body).expect("PUT body is not JSON");
    let encoded = json["content"].as_str().expect("PUT body has no content");
    String::from_utf8(STANDARD.decode(encoded).expect("invalid base64")).expect("invalid utf-8")
}

/// Run git in `dir`, panicking with stderr on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test User")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test User")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}
