//! Error types for the preview server.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Requested asset does not resolve to a file inside the working directory.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Markdown file to preview could not be read.
    #[error("Cannot read {}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            Self::AssetNotFound(path) => {
                tracing::debug!(path = %path, "Asset not found");
                (StatusCode::NOT_FOUND, "Asset not found").into_response()
            }
            Self::Document { .. } | Self::Io(_) => {
                tracing::error!(error = %self, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Error serving asset").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_asset_not_found_is_404() {
        let response = ServerError::AssetNotFound("a.png".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_io_is_500() {
        let error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let response = ServerError::from(error).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_document_error_message() {
        let error = ServerError::Document {
            path: PathBuf::from("/tmp/missing.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(error.to_string(), "Cannot read /tmp/missing.md: no such file");
    }
}
