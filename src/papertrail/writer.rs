//! Append a commit section to the papertrail file.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{PapertrailError, StoreError};

use super::LogStore;
use super::format::{
    DEFAULT_HEADER, entry_timestamp, format_section, format_timestamp, update_commit_message,
};
use super::retry::retry_with_backoff;

/// Generated text for one commit, ready to be logged.
#[derive(Debug, Clone)]
pub struct LogEntry<'a> {
    pub sha: &'a str,
    pub message: &'a str,
    pub summary: &'a str,
    /// The commit's own timestamp, if known.
    pub timestamp: Option<DateTime<Utc>>,
}

impl LogEntry<'_> {
    /// The Markdown section this entry appends.
    pub fn section(&self) -> String {
        let timestamp = format_timestamp(entry_timestamp(self.timestamp));
        format_section(self.sha, &timestamp, self.summary, self.message)
    }
}

fn map_store_error(path: &str, err: StoreError) -> PapertrailError {
    match err {
        StoreError::Conflict => PapertrailError::Conflict {
            path: path.to_string(),
        },
        other => PapertrailError::UpdateFailed(other.to_string()),
    }
}

/// Read-modify-write one section onto `path`.
///
/// A missing file starts from [`DEFAULT_HEADER`] and is created without a
/// revision. An existing file is rewritten guarded by the revision it was
/// read at, so a concurrent edit surfaces as [`PapertrailError::Conflict`].
pub async fn append_entry(
    store: &dyn LogStore,
    path: &str,
    entry: &LogEntry<'_>,
) -> Result<(), PapertrailError> {
    let existing = store
        .read(path)
        .await
        .map_err(|e| map_store_error(path, e))?;

    let (content, revision) = match existing {
        Some(file) => (file.content, Some(file.revision)),
        None => {
            debug!("{path} does not exist yet; starting from the default header");
            (DEFAULT_HEADER.to_string(), None)
        }
    };

    let updated = content + &entry.section();

    store
        .write(
            path,
            &updated,
            revision.as_deref(),
            &update_commit_message(entry.sha),
        )
        .await
        .map_err(|e| map_store_error(path, e))?;

    info!("Updated {path} for commit {}", entry.sha);
    Ok(())
}

/// [`append_entry`], re-run from a fresh read up to `extra_attempts` more times on conflict.
pub async fn append_entry_with_retry(
    store: &dyn LogStore,
    path: &str,
    entry: &LogEntry<'_>,
    extra_attempts: u32,
) -> Result<(), PapertrailError> {
    retry_with_backoff(
        extra_attempts,
        || append_entry(store, path, entry),
        PapertrailError::is_conflict,
    )
    .await
}
