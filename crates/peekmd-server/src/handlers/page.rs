//! Preview page handler.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use peekmd_renderer::{extract_description, extract_topics};

use crate::assets::rewrite_asset_urls;
use crate::file_tree::{DEFAULT_TREE_DEPTH, file_tree, render_file_tree};
use crate::state::AppState;
use crate::template::{PageData, render_page};

/// Handle GET /.
///
/// Renders the document on every request so the page always reflects the
/// current working directory listing. The listing runs on the blocking pool.
pub(crate) async fn get_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let document = &state.document;

    let content = rewrite_asset_urls(&state.parser.render(&document.content));
    let root_dir = state.root_dir.clone();
    let tree = tokio::task::spawn_blocking(move || file_tree(&root_dir, DEFAULT_TREE_DEPTH))
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Directory listing task failed");
            Vec::new()
        });

    let page = PageData {
        filename: document.filename.clone(),
        repo_name: document.repo_name.clone(),
        dir_path: document.dir_path.clone(),
        description: extract_description(&document.content),
        topics: extract_topics(&document.repo_name),
        file_tree: render_file_tree(&tree),
        content,
    };

    tracing::debug!(file = %document.filename, "Rendered preview page");
    Html(render_page(&page))
}
