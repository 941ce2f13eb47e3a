//! peekmd CLI - markdown preview in the browser.
//!
//! Renders a markdown file as a repository landing page, serves it locally
//! and opens it in the default browser. The server exits when the browser
//! tab is closed or on Ctrl-C.

mod browser;
mod error;
mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use peekmd_server::{DEFAULT_PORT, PreviewServer, ServerConfig, is_markdown_file};
use tracing_subscriber::EnvFilter;

use error::CliError;
use output::Output;

/// Preview a markdown file in your browser, styled like a repository page.
#[derive(Parser, Debug)]
#[command(name = "peekmd", version, about)]
struct Cli {
    /// Markdown file to preview.
    file: PathBuf,

    /// Preferred port; a free one is picked when it is taken.
    #[arg(short, long, env = "PEEKMD_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Host to bind to.
    #[arg(long, env = "PEEKMD_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Do not open the browser.
    #[arg(long)]
    no_open: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = tokio::runtime::Runtime::new()
        .map_err(CliError::from)
        .and_then(|rt| rt.block_on(preview(cli, &output)));

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// Serve the preview until the browser tab closes.
async fn preview(cli: Cli, output: &Output) -> Result<(), CliError> {
    let markdown_path = resolve_markdown_path(&cli.file)?;
    if !is_markdown_file(&markdown_path) {
        output.warning(&format!(
            "Warning: File '{}' may not be a markdown file.",
            markdown_path.display()
        ));
    }

    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
        markdown_path: markdown_path.clone(),
        root_dir: std::env::current_dir()?,
    };
    let server = PreviewServer::bind(config).await?;

    let url = server.url();
    output.field("Web UI:", &url);
    output.field("Markdown:", &markdown_path.display().to_string());

    if !cli.no_open
        && let Err(e) = browser::open_browser(&url)
    {
        tracing::debug!(error = %e, "Failed to open browser");
        output.info(
            "[peekmd] Could not open browser automatically. Please open the URL manually.",
        );
    }

    server.run().await?;
    Ok(())
}

/// Absolute path of an existing file.
fn resolve_markdown_path(file: &Path) -> Result<PathBuf, CliError> {
    let path = std::path::absolute(file)?;
    if path.exists() {
        Ok(path)
    } else {
        Err(CliError::FileNotFound(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["peekmd", "README.md"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("README.md"));
        assert_eq!(cli.host, "127.0.0.1");
        assert!(!cli.no_open);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "peekmd", "docs/guide.md", "--port", "8080", "--host", "0.0.0.0", "--no-open", "-v",
        ])
        .unwrap();
        assert_eq!(cli.port, 8080);
        assert_eq!(cli.host, "0.0.0.0");
        assert!(cli.no_open);
        assert!(cli.verbose);
    }

    #[test]
    fn test_file_argument_required() {
        assert!(Cli::try_parse_from(["peekmd"]).is_err());
    }

    #[test]
    fn test_resolve_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.md");
        std::fs::write(&file, "# Notes").unwrap();

        let resolved = resolve_markdown_path(&file).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, file);
    }

    #[test]
    fn test_resolve_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.md");

        let err = resolve_markdown_path(&missing).unwrap_err();
        assert_eq!(err.to_string(), format!("File not found: {}", missing.display()));
    }
}
