//! The papertrail log: an append-only Markdown file of generated commit text.

pub mod format;
pub mod local;
pub mod retry;
pub mod writer;

use async_trait::async_trait;

use crate::error::StoreError;

pub use format::{DEFAULT_HEADER, format_section};
pub use local::LocalFileStore;
pub use writer::{LogEntry, append_entry, append_entry_with_retry};

/// Current content of a stored file and the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub content: String,
    pub revision: String,
}

/// A backing store supporting revision-guarded writes.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Read `path`, or `None` if it does not exist.
    async fn read(&self, path: &str) -> Result<Option<StoredFile>, StoreError>;

    /// Replace `path` with `content`.
    ///
    /// `revision` must be the one returned by the last read, or `None` to
    /// create the file. A stale revision fails with [`StoreError::Conflict`].
    async fn write(
        &self,
        path: &str,
        content: &str,
        revision: Option<&str>,
        commit_message: &str,
    ) -> Result<(), StoreError>;
}
