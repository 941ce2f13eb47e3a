//! Asset proxy handler.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::assets::{ASSET_CACHE_CONTROL, resolve_asset_path};
use crate::error::ServerError;
use crate::paths::content_type;
use crate::state::AppState;

/// Handle GET /__assets__/{*path}.
///
/// The path arrives percent-decoded.
pub(crate) async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ServerError> {
    let resolved = resolve_asset_path(&path, &state.document.markdown_dir, &state.root_dir)
        .ok_or_else(|| ServerError::AssetNotFound(path.clone()))?;

    let bytes = tokio::fs::read(&resolved).await?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type(&resolved)),
            (header::CACHE_CONTROL, ASSET_CACHE_CONTROL.to_owned()),
        ],
        bytes,
    )
        .into_response())
}
