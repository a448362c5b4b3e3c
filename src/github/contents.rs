//! Papertrail storage through the GitHub contents API.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::papertrail::{LogStore, StoredFile};

use super::status_code;

#[derive(Serialize)]
struct RefQuery<'a> {
    #[serde(rename = "ref")]
    reference: &'a str,
}

#[derive(Deserialize)]
struct ContentFile {
    sha: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}

/// A file on a branch of a GitHub repository. The revision is the blob sha.
pub struct GitHubContentStore {
    client: Octocrab,
    owner: String,
    repo: String,
    branch: String,
}

impl GitHubContentStore {
    pub fn new(client: Octocrab, owner: &str, repo: &str, branch: &str) -> Self {
        Self {
            client,
            owner: owner.to_string(),
            repo: repo.to_string(),
            branch: branch.to_string(),
        }
    }

    fn route(&self, path: &str) -> String {
        format!(
            "/repos/{}/{}/contents/{}",
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }
}

/// Decode the contents API's line-wrapped base64 payload.
fn decode_content(encoded: &str) -> Result<String, StoreError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| StoreError::Decode(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

fn is_conflict(err: &octocrab::Error) -> bool {
    match status_code(err) {
        Some(409) => true,
        // A create without sha races with someone else's create.
        Some(422) => err.to_string().contains("sha"),
        _ => false,
    }
}

#[async_trait]
impl LogStore for GitHubContentStore {
    async fn read(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let query = RefQuery {
            reference: &self.branch,
        };
        let result: Result<ContentFile, octocrab::Error> =
            self.client.get(self.route(path), Some(&query)).await;

        match result {
            Ok(file) => {
                let content = decode_content(file.content.as_deref().unwrap_or(""))?;
                debug!("Read {path} at {} ({} bytes)", file.sha, content.len());
                Ok(Some(StoredFile {
                    content,
                    revision: file.sha,
                }))
            }
            Err(e) if status_code(&e) == Some(404) => Ok(None),
            Err(e) => Err(StoreError::GitHub(Box::new(e))),
        }
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        revision: Option<&str>,
        commit_message: &str,
    ) -> Result<(), StoreError> {
        let body = PutContents {
            message: commit_message,
            content: STANDARD.encode(content.as_bytes()),
            sha: revision,
            branch: &self.branch,
        };

        let result: Result<serde_json::Value, octocrab::Error> =
            self.client.put(self.route(path), Some(&body)).await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_conflict(&e) => Err(StoreError::Conflict),
            Err(e) => Err(StoreError::GitHub(Box::new(e))),
        }
    }
}
