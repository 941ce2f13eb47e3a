//! Path helpers for the previewed document.

use std::ffi::OsStr;
use std::path::Path;

/// Repository name used when the document sits at the filesystem root.
pub const DEFAULT_REPO_NAME: &str = "peekmd";

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown"];

/// Name of the directory containing `path`, shown as the repository name.
#[must_use]
pub fn dir_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .and_then(OsStr::to_str)
        .map_or_else(|| DEFAULT_REPO_NAME.to_owned(), str::to_owned)
}

/// Directory part of `path`, empty when the document is in the current directory.
#[must_use]
pub fn relative_path(path: &Path) -> String {
    match path.parent() {
        Some(parent) if parent != Path::new(".") => parent.display().to_string(),
        _ => String::new(),
    }
}

/// Final component of `path`, or the whole path when it has none.
#[must_use]
pub fn filename(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Check for a `.md`, `.markdown` or `.mdown` extension, ignoring case.
#[must_use]
pub fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|md| ext.eq_ignore_ascii_case(md))
        })
}

/// Content type for a served asset, by extension.
pub(crate) fn content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dir_name() {
        assert_eq!(dir_name(Path::new("/Users/test/project/README.md")), "project");
        assert_eq!(dir_name(Path::new("/README.md")), DEFAULT_REPO_NAME);
        assert_eq!(dir_name(Path::new("README.md")), DEFAULT_REPO_NAME);
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path(Path::new("src/components/Button.tsx")), "src/components");
        assert_eq!(relative_path(Path::new("README.md")), "");
        assert_eq!(relative_path(Path::new("./README.md")), "");
    }

    #[test]
    fn test_filename() {
        assert_eq!(filename(Path::new("/path/to/file.md")), "file.md");
        assert_eq!(filename(Path::new("file.md")), "file.md");
    }

    #[test]
    fn test_is_markdown_file() {
        assert!(is_markdown_file(Path::new("README.md")));
        assert!(is_markdown_file(Path::new("doc.markdown")));
        assert!(is_markdown_file(Path::new("doc.mdown")));
        assert!(is_markdown_file(Path::new("README.MD")));
        assert!(!is_markdown_file(Path::new("script.js")));
        assert!(!is_markdown_file(Path::new("image.png")));
        assert!(!is_markdown_file(Path::new("Makefile")));
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("image.png")), "image/png");
        assert_eq!(content_type(Path::new("photo.JPG")), "image/jpeg");
        assert_eq!(content_type(Path::new("icon.svg")), "image/svg+xml");
        assert_eq!(content_type(Path::new("style.css")), "text/css");
        assert_eq!(content_type(Path::new("data.unknownext")), "application/octet-stream");
    }
}
