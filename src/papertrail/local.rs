//! Papertrail storage on the local filesystem, for runs outside of CI.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StoreError;

use super::{LogStore, StoredFile};

/// Files under a root directory. The revision is the file's size and mtime.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

fn revision_of(path: &Path) -> io::Result<Option<String>> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };
    let mtime = metadata
        .modified()?
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    Ok(Some(format!("{}:{mtime}", metadata.len())))
}

fn read_blocking(path: &Path) -> Result<Option<StoredFile>, StoreError> {
    let Some(revision) = revision_of(path).map_err(StoreError::Io)? else {
        return Ok(None);
    };
    let content = fs::read_to_string(path).map_err(StoreError::Io)?;
    Ok(Some(StoredFile { content, revision }))
}

fn write_blocking(path: &Path, content: &str, revision: Option<&str>) -> Result<(), StoreError> {
    let current = revision_of(path).map_err(StoreError::Io)?;
    if current.as_deref() != revision {
        debug!(
            "Revision mismatch for {}: expected {:?}, found {:?}",
            path.display(),
            revision,
            current
        );
        return Err(StoreError::Conflict);
    }

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(StoreError::Io)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(StoreError::Io)?;
    tmp.write_all(content.as_bytes()).map_err(StoreError::Io)?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

fn join_error(e: tokio::task::JoinError) -> StoreError {
    StoreError::Io(io::Error::other(e))
}

#[async_trait]
impl LogStore for LocalFileStore {
    async fn read(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let full = self.resolve(path);
        tokio::task::spawn_blocking(move || read_blocking(&full))
            .await
            .map_err(join_error)?
    }

    async fn write(
        &self,
        path: &str,
        content: &str,
        revision: Option<&str>,
        commit_message: &str,
    ) -> Result<(), StoreError> {
        let full = self.resolve(path);
        let content = content.to_string();
        let revision = revision.map(str::to_string);
        debug!("Writing {} locally ({commit_message})", full.display());
        tokio::task::spawn_blocking(move || write_blocking(&full, &content, revision.as_deref()))
            .await
            .map_err(join_error)?
    }
}
