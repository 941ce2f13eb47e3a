//! Application state.
//!
//! Shared state for all request handlers.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use peekmd_renderer::MarkdownParser;
use tokio::sync::Notify;

use crate::paths;

/// How long a closed preview waits for a `/ping` before the server stops.
pub(crate) const CLOSE_GRACE: Duration = Duration::from_secs(1);

/// The markdown file being previewed.
pub(crate) struct Document {
    /// Markdown source, read once at startup.
    pub(crate) content: String,
    pub(crate) filename: String,
    pub(crate) repo_name: String,
    pub(crate) dir_path: String,
    /// Directory relative asset paths are resolved against first.
    pub(crate) markdown_dir: PathBuf,
}

impl Document {
    /// Describe the document at `path` (absolute) with the given source.
    pub(crate) fn new(path: &Path, content: String) -> Self {
        Self {
            content,
            filename: paths::filename(path),
            repo_name: paths::dir_name(path),
            dir_path: paths::relative_path(path),
            markdown_dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        }
    }
}

/// Application state shared across all handlers.
pub(crate) struct AppState {
    pub(crate) document: Document,
    /// Working directory; listed in the file table and the boundary for assets.
    pub(crate) root_dir: PathBuf,
    pub(crate) parser: MarkdownParser,
    /// Whether a browser tab is showing the preview.
    is_open: AtomicBool,
    /// Signalled when the preview was closed and not reopened in time.
    pub(crate) shutdown: Notify,
    close_grace: Duration,
}

impl AppState {
    pub(crate) fn new(document: Document, root_dir: PathBuf, close_grace: Duration) -> Self {
        Self {
            document,
            root_dir,
            parser: MarkdownParser::default(),
            is_open: AtomicBool::new(false),
            shutdown: Notify::new(),
            close_grace,
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.is_open.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_open(&self) {
        self.is_open.store(true, Ordering::SeqCst);
    }

    pub(crate) fn mark_closed(&self) {
        self.is_open.store(false, Ordering::SeqCst);
    }

    pub(crate) fn close_grace(&self) -> Duration {
        self.close_grace
    }
}
