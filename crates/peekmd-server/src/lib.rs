//! HTTP preview server for peekmd.
//!
//! Serves one markdown document rendered as a repository landing page:
//! - `/` renders the page
//! - `/__assets__/{path}` proxies images referenced by the document
//! - `/ping` and `/close` track whether a browser tab is showing the page
//!
//! The server stops on Ctrl-C, or shortly after the last tab closes.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//! use peekmd_server::{PreviewServer, ServerConfig};
//!
//! # async fn example() -> Result<(), peekmd_server::ServerError> {
//! let config = ServerConfig {
//!     markdown_path: PathBuf::from("README.md"),
//!     ..ServerConfig::default()
//! };
//!
//! let server = PreviewServer::bind(config).await?;
//! println!("Preview at {}", server.url());
//! server.run().await
//! # }
//! ```

mod app;
mod assets;
mod error;
mod file_tree;
mod handlers;
mod middleware;
mod paths;
mod state;
mod template;

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

pub use assets::{ASSETS_PREFIX, resolve_asset_path, rewrite_asset_urls};
pub use error::ServerError;
pub use file_tree::{DEFAULT_TREE_DEPTH, FileNode, NodeKind, file_tree, format_size, render_file_tree};
pub use paths::{DEFAULT_REPO_NAME, dir_name, filename, is_markdown_file, relative_path};
pub use template::{MERMAID_MODULE_URL, PageData, render_page};

use state::{AppState, CLOSE_GRACE, Document};

/// Port tried first when none is configured.
pub const DEFAULT_PORT: u16 = 3456;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Preferred port; another free port is used when it is taken.
    pub port: u16,
    /// Markdown file to preview.
    pub markdown_path: PathBuf,
    /// Directory listed in the file table; assets must live under it.
    pub root_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: DEFAULT_PORT,
            markdown_path: PathBuf::from("README.md"),
            root_dir: PathBuf::from("."),
        }
    }
}

/// A bound, not yet running, preview server.
pub struct PreviewServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: Arc<AppState>,
}

impl PreviewServer {
    /// Read the document and bind the listener.
    ///
    /// Falls back to an OS-assigned port when the preferred one is in use.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or no port can be bound.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let document_error = |source| ServerError::Document {
            path: config.markdown_path.clone(),
            source,
        };
        let markdown_path = config.markdown_path.canonicalize().map_err(document_error)?;
        let content = tokio::fs::read_to_string(&markdown_path)
            .await
            .map_err(document_error)?;
        let root_dir = config.root_dir.canonicalize()?;

        let listener = bind_listener(&config.host, config.port).await?;
        let local_addr = listener.local_addr()?;

        let state = Arc::new(AppState::new(
            Document::new(&markdown_path, content),
            root_dir,
            CLOSE_GRACE,
        ));

        Ok(Self {
            listener,
            local_addr,
            state,
        })
    }

    /// Address the server is listening on.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// URL to open in a browser.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.local_addr.port())
    }

    /// Serve requests until Ctrl-C or until the preview is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails while serving.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = app::create_router(Arc::clone(&self.state));

        tracing::info!(address = %self.local_addr, "Starting server");
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal(self.state))
            .await?;

        Ok(())
    }
}

/// Bind and run the server.
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    PreviewServer::bind(config).await?.run().await
}

async fn bind_listener(host: &str, port: u16) -> Result<TcpListener, ServerError> {
    match TcpListener::bind((host, port)).await {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == ErrorKind::AddrInUse && port != 0 => {
            let listener = TcpListener::bind((host, 0)).await?;
            let fallback = listener.local_addr()?.port();
            tracing::warn!(port, fallback, "Port {port} in use, using {fallback} instead");
            Ok(listener)
        }
        Err(e) => Err(e.into()),
    }
}

/// Wait for Ctrl-C or for the preview to be closed.
async fn shutdown_signal(state: Arc<AppState>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Shutdown signal received, stopping server..."),
        () = state.shutdown.notified() => tracing::info!("Preview closed, stopping server..."),
    }
}
