//! Working directory listing shown above the document.

use std::fmt::Write;
use std::fs;
use std::path::Path;

use peekmd_renderer::escape_html;

/// Directory levels collected below the root.
pub const DEFAULT_TREE_DEPTH: usize = 3;

/// Entries listed per directory.
const MAX_ENTRIES: usize = 20;

const FILE_ICON: &str = r#"<svg aria-hidden="true" focusable="false" class="octicon octicon-file color-fg-muted" viewBox="0 0 16 16" width="16" height="16" fill="currentColor"><path d="M2 1.75C2 .784 2.784 0 3.75 0h6.586c.464 0 .909.184 1.237.513l2.914 2.914c.329.328.513.773.513 1.237v9.586A1.75 1.75 0 0 1 13.25 16h-9.5A1.75 1.75 0 0 1 2 14.25Zm1.75-.25a.25.25 0 0 0-.25.25v12.5c0 .138.112.25.25.25h9.5a.25.25 0 0 0 .25-.25V6h-2.75A1.75 1.75 0 0 1 9 4.25V1.5Zm6.75.062V4.25c0 .138.112.25.25.25h2.688l-.011-.013-2.914-2.914-.013-.011Z"></path></svg>"#;

const FOLDER_ICON: &str = r#"<svg aria-hidden="true" focusable="false" class="octicon octicon-file-directory-fill color-fg-muted" viewBox="0 0 16 16" width="16" height="16" fill="currentColor"><path d="M1.75 1A1.75 1.75 0 0 0 0 2.75v10.5C0 14.216.784 15 1.75 15h12.5A1.75 1.75 0 0 0 16 13.25v-8.5A1.75 1.75 0 0 0 14.25 3H7.5a.25.25 0 0 1-.2-.1l-.9-1.2C6.07 1.26 5.55 1 5 1H1.75Z"></path></svg>"#;

/// Kind of a listed entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Folder,
}

/// A listed directory entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileNode {
    pub name: String,
    pub kind: NodeKind,
    /// Entries of a folder, empty for files and for folders at the depth limit.
    pub children: Vec<FileNode>,
    /// Human-readable size, empty for folders.
    pub size: String,
}

/// Format a byte count as `B`, `KB` or `MB` with one decimal.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * 1024;

    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// List `dir` up to `max_depth` levels deep.
///
/// Entries are sorted by name and capped per directory. Symlinks are not
/// followed. Unreadable directories and entries are skipped.
#[must_use]
pub fn file_tree(dir: &Path, max_depth: usize) -> Vec<FileNode> {
    collect(dir, max_depth, 0)
}

fn collect(dir: &Path, max_depth: usize, depth: usize) -> Vec<FileNode> {
    if depth >= max_depth {
        return Vec::new();
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(path = %dir.display(), error = %e, "Skipping unreadable directory");
            return Vec::new();
        }
    };

    let mut names: Vec<_> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.file_name())
        .collect();
    names.sort();

    names
        .into_iter()
        .take(MAX_ENTRIES)
        .filter_map(|name| {
            let path = dir.join(&name);
            let metadata = fs::symlink_metadata(&path).ok()?;
            let name = name.to_string_lossy().into_owned();
            let node = if metadata.is_dir() {
                FileNode {
                    name,
                    kind: NodeKind::Folder,
                    children: collect(&path, max_depth, depth + 1),
                    size: String::new(),
                }
            } else {
                FileNode {
                    name,
                    kind: NodeKind::File,
                    children: Vec::new(),
                    size: format_size(metadata.len()),
                }
            };
            Some(node)
        })
        .collect()
}

/// Render the top-level entries as a repository file table.
#[must_use]
pub fn render_file_tree(nodes: &[FileNode]) -> String {
    let mut html = String::with_capacity(1024 + nodes.len() * 1024);

    html.push_str(
        "<table class=\"Table-module__Box--KyMHK\" aria-labelledby=\"folders-and-files\">\n",
    );
    html.push_str("<thead class=\"DirectoryContent-module__OverviewHeaderRow--FlrUZ Table-module__Box_1--DkRqs\">\n");
    html.push_str("<tr class=\"Table-module__Box_2--l1wjV\">\n");
    html.push_str("<th colspan=\"2\" class=\"DirectoryContent-module__Box--y3Nvf\"><span class=\"text-bold\">Name</span></th>\n");
    html.push_str("<th class=\"hide-sm\"><span class=\"text-bold\">Last commit message</span></th>\n");
    html.push_str("<th colspan=\"1\" class=\"DirectoryContent-module__Box_2--h912w\"><span class=\"text-bold\">Last commit date</span></th>\n");
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for (index, node) in nodes.iter().enumerate() {
        render_row(&mut html, index, node);
    }

    html.push_str("</tbody>\n</table>");
    html
}

fn render_row(html: &mut String, index: usize, node: &FileNode) {
    let icon = match node.kind {
        NodeKind::Folder => FOLDER_ICON,
        NodeKind::File => FILE_ICON,
    };
    let name = escape_html(&node.name);

    let _ = writeln!(
        html,
        "<tr class=\"react-directory-row\" id=\"folder-row-{index}\">"
    );
    html.push_str("<td class=\"react-directory-row-name-cell-small-screen\" colspan=\"2\">");
    html.push_str("<div class=\"react-directory-filename-column\">");
    html.push_str(icon);
    html.push_str("<div class=\"overflow-hidden\"><div class=\"react-directory-filename-cell\">");
    let _ = write!(
        html,
        "<div class=\"react-directory-truncate\"><a title=\"{name}\" class=\"Link--primary\" href=\"#\">{name}</a></div>"
    );
    html.push_str("</div></div></div></td>\n");
    html.push_str("<td class=\"react-directory-row-commit-cell hide-sm\">");
    html.push_str("<div class=\"react-directory-commit-message\"><a data-pjax=\"true\" title=\"Initial commit\" class=\"Link--secondary\" href=\"#\">Initial commit</a></div>");
    html.push_str("</td>\n");
    let _ = writeln!(
        html,
        "<td><div class=\"react-directory-commit-age\">{}</div></td>",
        node.size
    );
    html.push_str("</tr>\n");
}
