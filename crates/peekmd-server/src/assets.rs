//! Local asset proxy.
//!
//! Relative image sources in the rendered document are rewritten to point at
//! [`ASSETS_PREFIX`]; requests under that prefix are resolved against the
//! markdown file's directory and then the working directory, and are only
//! served when they stay inside the working directory.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::{Captures, Regex};

/// URL prefix of the asset proxy.
pub const ASSETS_PREFIX: &str = "/__assets__/";

/// Cache header sent with every proxied asset.
pub(crate) const ASSET_CACHE_CONTROL: &str = "public, max-age=31536000";

/// Characters left alone by URI component encoding.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static IMG_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<img[^>]*\ssrc=["'])([^"']+)(["'][^>]*>)"#).unwrap()
});

/// Point relative `<img src>` attributes at the asset proxy.
///
/// Remote (`http://`, `https://`, `//`), `data:` and already proxied sources
/// are left untouched.
#[must_use]
pub fn rewrite_asset_urls(html: &str) -> String {
    IMG_SRC_RE
        .replace_all(html, |caps: &Captures<'_>| {
            let src = &caps[2];
            if is_external(src) || src.starts_with(ASSETS_PREFIX) {
                return caps[0].to_owned();
            }
            format!(
                "{}{ASSETS_PREFIX}{}{}",
                &caps[1],
                utf8_percent_encode(src, COMPONENT),
                &caps[3]
            )
        })
        .into_owned()
}

fn is_external(src: &str) -> bool {
    let lower = src.to_ascii_lowercase();
    ["http://", "https://", "data:", "//"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
}

/// Resolve a requested asset path to a file inside `root`.
///
/// Absolute paths are used as-is; relative ones are tried against
/// `markdown_dir` first and `root` second. Paths containing `..` are
/// rejected outright. Returns the canonical path of a regular file under
/// `root`, or `None`.
#[must_use]
pub fn resolve_asset_path(asset_path: &str, markdown_dir: &Path, root: &Path) -> Option<PathBuf> {
    if asset_path.is_empty() || asset_path.contains("..") {
        return None;
    }

    let requested = Path::new(asset_path);
    let candidates = if requested.is_absolute() {
        vec![requested.to_path_buf()]
    } else {
        vec![markdown_dir.join(requested), root.join(requested)]
    };

    let root = root.canonicalize().ok()?;
    candidates
        .into_iter()
        .find_map(|candidate| valid_asset(&candidate, &root))
}

fn valid_asset(candidate: &Path, root: &Path) -> Option<PathBuf> {
    let resolved = candidate.canonicalize().ok()?;
    (resolved.starts_with(root) && resolved.is_file()).then_some(resolved)
}
