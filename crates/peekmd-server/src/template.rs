//! HTML page template for the preview.
//!
//! Lays the rendered document out like a repository landing page: header,
//! file table, README box and an "About" sidebar. Styling is inline so the
//! page needs nothing from the server besides `/`, `/ping` and `/close`.

use std::fmt::Write;

use peekmd_renderer::escape_html;

/// Mermaid ES module loaded by the page.
pub const MERMAID_MODULE_URL: &str =
    "https://cdn.jsdelivr.net/npm/mermaid@11/dist/mermaid.esm.min.mjs";

const STARS: u32 = 0;
const WATCHERS: u32 = 1;
const FORKS: u32 = 0;

const GITHUB_MARK: &str = r#"<svg viewBox="0 0 16 16" width="32" height="32" fill="currentColor"><path d="M8 0c4.42 0 8 3.58 8 8a8.013 8.013 0 0 1-5.45 7.59c-.4.08-.55-.17-.55-.38 0-.27.01-1.13.01-2.2 0-.75-.25-1.23-.54-1.48 1.78-.2 3.65-.88 3.65-3.95 0-.88-.31-1.59-.82-2.15.08-.2.36-1.02-.08-2.12 0 0-.67-.22-2.2.82-.64-.18-1.32-.27-2-.27-.68 0-1.36.09-2 .27-1.53-1.03-2.2-.82-2.2-.82-.44 1.1-.16 1.92-.08 2.12-.51.56-.82 1.28-.82 2.15 0 3.06 1.86 3.75 3.64 3.95-.23.2-.44.55-.51 1.07-.46.21-1.61.55-2.33-.66-.15-.24-.6-.83-1.23-.82-.67.01-.27.38.01.53.34.19.73.9.82 1.13.16.45.68 1.31 2.69.94 0 .67.01 1.3.01 1.49 0 .21-.15.45-.55.38A7.995 7.995 0 0 1 0 8c0-4.42 3.58-8 8-8Z"></path></svg>"#;

const REPO_ICON: &str = r#"<svg viewBox="0 0 16 16" width="16" height="16" fill="currentColor"><path d="M2 2.5A2.5 2.5 0 0 1 4.5 0h8.75a.75.75 0 0 1 .75.75v12.5a.75.75 0 0 1-.75.75h-2.5a.75.75 0 0 1 0-1.5h1.75v-2h-8a1 1 0 0 0-.714 1.7.75.75 0 1 1-1.072 1.05A2.495 2.495 0 0 1 2 11.5Zm10.5-1h-8c-.356 0-.694.074-1 .208V2.5a1 1 0 0 1 1-1ZM5 12.25v3.25a.25.25 0 0 0 .4.2l1.45-1.087a.25.25 0 0 1 .3 0L8.6 15.7a.25.25 0 0 0 .4-.2v-3.25a.25.25 0 0 0-.25-.25h-3.5a.25.25 0 0 0-.25.25Z"></path></svg>"#;

const BOOK_ICON: &str = r#"<svg viewBox="0 0 16 16" width="16" height="16" fill="currentColor"><path d="M0 1.75A.75.75 0 0 1 .75 1h4.253c1.227 0 2.317.59 3 1.501A3.743 3.743 0 0 1 11.006 1h4.245a.75.75 0 0 1 .75.75v10.5a.75.75 0 0 1-.75.75h-4.507a2.25 2.25 0 0 0-1.591.659l-.622.621a.75.75 0 0 1-1.06 0l-.622-.621A2.25 2.25 0 0 0 5.258 13H.75a.75.75 0 0 1-.75-.75Zm7.251 10.324.004-5.073-.002-2.253A2.25 2.25 0 0 0 5.003 2.5H1.5v9h3.757a3.75 3.75 0 0 1 1.994.574ZM8.755 4.75l-.004 7.322a3.752 3.752 0 0 1 1.992-.572H14.5v-9h-3.495a2.25 2.25 0 0 0-2.25 2.25Z"></path></svg>"#;

const SUN_ICON: &str = r#"<svg class="icon-sun" viewBox="0 0 24 24" width="16" height="16" fill="none" stroke="currentColor" stroke-width="2"><circle cx="12" cy="12" r="5"/><path d="M12 1v2M12 21v2M4.22 4.22l1.42 1.42M18.36 18.36l1.42 1.42M1 12h2M21 12h2M4.22 19.78l1.42-1.42M18.36 5.64l1.42-1.42"/></svg>"#;

const MOON_ICON: &str = r#"<svg class="icon-moon" viewBox="0 0 24 24" width="16" height="16" fill="none" stroke="currentColor" stroke-width="2"><path d="M21 12.79A9 9 0 1 1 11.21 3 7 7 0 0 0 21 12.79z"/></svg>"#;

const STYLES: &str = r"
:root {
  --fg: #1f2328; --fg-muted: #59636e; --bg: #ffffff; --bg-subtle: #f6f8fa;
  --border: #d1d9e0; --accent: #0969da; --header-bg: #f6f8fa;
  --note: #0969da; --tip: #1a7f37; --important: #8250df; --warning: #9a6700; --caution: #d1242f;
}
html.dark {
  --fg: #f0f6fc; --fg-muted: #9198a1; --bg: #0d1117; --bg-subtle: #151b23;
  --border: #3d444d; --accent: #4493f8; --header-bg: #010409;
  --note: #4493f8; --tip: #3fb950; --important: #ab7df8; --warning: #d29922; --caution: #f85149;
}
* { box-sizing: border-box; }
body { margin: 0; color: var(--fg); background: var(--bg);
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
  font-size: 14px; line-height: 1.5; }
a { color: var(--accent); text-decoration: none; }
a:hover { text-decoration: underline; }
svg { vertical-align: text-bottom; }
.AppHeader { display: flex; align-items: center; gap: 16px; padding: 16px 24px;
  background: var(--header-bg); border-bottom: 1px solid var(--border); }
.AppHeader-logo { color: var(--fg); display: flex; }
.AppHeader-search { flex: 1; max-width: 320px; padding: 5px 12px; color: var(--fg);
  background: var(--bg); border: 1px solid var(--border); border-radius: 6px; }
.AppHeader-nav { display: flex; align-items: center; gap: 16px; margin-left: auto; }
.AppHeader-nav a { color: var(--fg); font-weight: 600; }
.dark-toggle { display: flex; padding: 6px; color: var(--fg); background: transparent;
  border: 1px solid var(--border); border-radius: 6px; cursor: pointer; }
.icon-moon, html.dark .icon-sun { display: none; }
html.dark .icon-moon { display: inline; }
.repohead { padding: 16px 32px 0; background: var(--header-bg); }
.repohead-details-container { display: flex; align-items: center; gap: 8px; font-size: 20px; color: var(--fg-muted); }
.repohead-name a:first-child { font-weight: 400; }
.repohead-name a:last-child { font-weight: 600; }
.separator { margin: 0 4px; }
.UnderlineNav { padding: 0 32px; background: var(--header-bg); border-bottom: 1px solid var(--border); }
.UnderlineNav-body { display: flex; gap: 8px; }
.UnderlineNav-item { display: flex; align-items: center; gap: 8px; padding: 12px 8px; color: var(--fg);
  border-bottom: 2px solid transparent; }
.UnderlineNav-item.selected { font-weight: 600; border-bottom-color: #fd8c73; }
.container-xl { max-width: 1280px; margin: 0 auto; padding: 24px 32px; }
.Layout { display: grid; grid-template-columns: minmax(0, 1fr) 296px; gap: 24px; }
.Box { margin-bottom: 16px; border: 1px solid var(--border); border-radius: 6px; overflow: hidden; }
.Box-header { display: flex; align-items: center; justify-content: space-between; padding: 8px 16px;
  background: var(--bg-subtle); border-bottom: 1px solid var(--border); }
.Box-header-title { display: flex; align-items: center; gap: 8px; font-weight: 600; }
details.Box > summary { cursor: pointer; list-style: none; }
.Table-module__Box--KyMHK { width: 100%; border-collapse: collapse; }
.Table-module__Box--KyMHK th { padding: 8px 16px; text-align: left; color: var(--fg-muted);
  border-bottom: 1px solid var(--border); }
.Table-module__Box--KyMHK td { padding: 8px 16px; border-top: 1px solid var(--border); }
.react-directory-filename-column { display: flex; align-items: center; gap: 10px; }
.react-directory-commit-message a, .react-directory-commit-age { color: var(--fg-muted); }
.Link--primary { color: var(--fg); }
.color-fg-muted { color: var(--fg-muted); }
.text-bold { font-weight: 600; }
.BorderGrid-cell { padding: 16px 0; border-bottom: 1px solid var(--border); }
.BorderGrid-cell h2 { margin: 0 0 16px; font-size: 16px; }
.sidebar-link { display: flex; align-items: center; gap: 8px; margin-top: 8px; color: var(--fg-muted); }
.topic-tag { display: inline-block; margin: 0 4px 6px 0; padding: 0 10px; font-size: 12px; font-weight: 500;
  line-height: 22px; border-radius: 2em; background: rgba(56, 139, 253, 0.1); }
.Progress { display: flex; height: 8px; margin-bottom: 8px; overflow: hidden; border-radius: 6px; }
.lang-list { margin: 0; padding: 0; list-style: none; }
.lang-dot { display: inline-block; width: 8px; height: 8px; margin-right: 6px; border-radius: 50%; }
.lang-name { font-weight: 600; margin-right: 4px; }
.lang-percent { color: var(--fg-muted); }
.markdown-body { padding: 32px; font-size: 16px; line-height: 1.5; word-wrap: break-word; }
.markdown-body > *:first-child { margin-top: 0 !important; }
.markdown-body h1, .markdown-body h2, .markdown-body h3, .markdown-body h4, .markdown-body h5, .markdown-body h6 {
  position: relative; margin: 24px 0 16px; font-weight: 600; line-height: 1.25; }
.markdown-body h1 { font-size: 2em; padding-bottom: .3em; border-bottom: 1px solid var(--border); }
.markdown-body h2 { font-size: 1.5em; padding-bottom: .3em; border-bottom: 1px solid var(--border); }
.markdown-body h3 { font-size: 1.25em; }
.markdown-body .anchor { position: absolute; left: -20px; padding-right: 4px; color: var(--fg); opacity: 0; }
.markdown-body h1:hover .anchor, .markdown-body h2:hover .anchor, .markdown-body h3:hover .anchor,
.markdown-body h4:hover .anchor, .markdown-body h5:hover .anchor, .markdown-body h6:hover .anchor { opacity: 1; }
.markdown-body p, .markdown-body blockquote, .markdown-body ul, .markdown-body ol, .markdown-body table,
.markdown-body pre, .markdown-body .markdown-alert { margin: 0 0 16px; }
.markdown-body ul, .markdown-body ol { padding-left: 2em; }
.markdown-body blockquote { padding: 0 1em; color: var(--fg-muted); border-left: .25em solid var(--border); }
.markdown-body code { padding: .2em .4em; font-size: 85%; background: var(--bg-subtle); border-radius: 6px;
  font-family: ui-monospace, SFMono-Regular, 'SF Mono', Menlo, Consolas, monospace; }
.markdown-body pre { padding: 16px; overflow: auto; font-size: 85%; line-height: 1.45;
  background: var(--bg-subtle); border-radius: 6px; }
.markdown-body pre code { padding: 0; font-size: 100%; background: transparent; }
.markdown-body pre.mermaid { text-align: center; background: transparent; }
.markdown-body table { display: block; width: max-content; max-width: 100%; overflow: auto; border-collapse: collapse; }
.markdown-body th, .markdown-body td { padding: 6px 13px; border: 1px solid var(--border); }
.markdown-body tr:nth-child(2n) { background: var(--bg-subtle); }
.markdown-body img { max-width: 100%; background: var(--bg); }
.markdown-body hr { height: .25em; margin: 24px 0; padding: 0; background: var(--border); border: 0; }
.markdown-body .task-list-item { list-style-type: none; }
.markdown-body .task-list-item-checkbox { margin: 0 .2em .25em -1.4em; vertical-align: middle; }
.markdown-body .contains-task-list { padding-left: 2em; }
.markdown-body .footnotes { font-size: 12px; color: var(--fg-muted); }
.markdown-body .footnotes-sep { height: 1px; }
.markdown-alert { padding: 8px 16px; color: inherit; border-left: .25em solid var(--border); }
.markdown-alert > :last-child { margin-bottom: 0; }
.markdown-alert-title { display: flex; align-items: center; gap: 8px; font-weight: 500; }
.markdown-alert .octicon { fill: currentColor; }
.markdown-alert-note { border-left-color: var(--note); } .markdown-alert-note .markdown-alert-title { color: var(--note); }
.markdown-alert-tip { border-left-color: var(--tip); } .markdown-alert-tip .markdown-alert-title { color: var(--tip); }
.markdown-alert-important { border-left-color: var(--important); } .markdown-alert-important .markdown-alert-title { color: var(--important); }
.markdown-alert-warning { border-left-color: var(--warning); } .markdown-alert-warning .markdown-alert-title { color: var(--warning); }
.markdown-alert-caution { border-left-color: var(--caution); } .markdown-alert-caution .markdown-alert-title { color: var(--caution); }
.hljs-comment { color: #59636e; font-style: italic; }
.hljs-keyword, .hljs-storage { color: #cf222e; }
.hljs-string { color: #0a3069; }
.hljs-constant, .hljs-support { color: #0550ae; }
.hljs-entity { color: #8250df; }
.hljs-variable { color: #953800; }
html.dark .hljs-comment { color: #9198a1; }
html.dark .hljs-keyword, html.dark .hljs-storage { color: #ff7b72; }
html.dark .hljs-string { color: #a5d6ff; }
html.dark .hljs-constant, html.dark .hljs-support { color: #79c0ff; }
html.dark .hljs-entity { color: #d2a8ff; }
html.dark .hljs-variable { color: #ffa657; }
@media (max-width: 768px) {
  .Layout { grid-template-columns: 1fr; }
  .hide-sm, .AppHeader-search { display: none; }
}
";

const SCRIPTS: &str = r"
fetch('/ping');
window.addEventListener('beforeunload', () => { fetch('/close'); });
document.addEventListener('keydown', (e) => { if (e.key === 'Escape') window.close(); });

const toggle = document.getElementById('darkToggle');
const setDark = (dark) => {
  document.documentElement.classList.toggle('dark', dark);
  localStorage.setItem('dark', dark);
  if (window.updateMermaidTheme) window.updateMermaidTheme(dark);
};
const stored = localStorage.getItem('dark');
setDark(stored !== null ? stored === 'true' : window.matchMedia('(prefers-color-scheme: dark)').matches);
toggle.addEventListener('click', () => setDark(!document.documentElement.classList.contains('dark')));

const fileTree = document.querySelector('details.Box');
if (fileTree) {
  const storedTree = localStorage.getItem('fileTreeOpen');
  if (storedTree !== null) fileTree.open = storedTree === 'true';
  fileTree.addEventListener('toggle', () => localStorage.setItem('fileTreeOpen', fileTree.open));
}
";

/// Data needed to render the preview page.
#[derive(Clone, Debug, Default)]
pub struct PageData {
    /// Document file name, shown in the title and README box.
    pub filename: String,
    /// Name of the directory holding the document.
    pub repo_name: String,
    /// Directory path shown above the file table.
    pub dir_path: String,
    pub description: String,
    pub topics: Vec<String>,
    /// Pre-rendered file table.
    pub file_tree: String,
    /// Pre-rendered document HTML.
    pub content: String,
}

/// Render the complete preview page.
///
/// Text fields are escaped; `file_tree` and `content` are inserted as-is.
#[must_use]
pub fn render_page(page: &PageData) -> String {
    let filename = escape_html(&page.filename);
    let repo_name = escape_html(&page.repo_name);

    let mut html = String::with_capacity(page.content.len() + page.file_tree.len() + 16384);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{filename} - {repo_name}</title>");
    html.push_str("<style>");
    html.push_str(STYLES);
    html.push_str("</style>\n</head>\n<body>\n");

    render_header(&mut html);

    // Repository name and navigation tabs
    html.push_str("<div class=\"repohead\"><div class=\"repohead-details-container\">");
    html.push_str(REPO_ICON);
    let _ = write!(
        html,
        "<div class=\"repohead-name\"><a href=\"#\">{repo_name}</a><span class=\"separator\">/</span><a href=\"#\">{filename}</a></div>"
    );
    html.push_str("</div></div>\n");
    html.push_str("<nav class=\"UnderlineNav\"><div class=\"UnderlineNav-body\">");
    for (idx, tab) in ["Code", "Issues", "Pull requests", "Actions", "Projects", "Security", "Insights"]
        .iter()
        .enumerate()
    {
        let selected = if idx == 0 { " selected" } else { "" };
        let _ = write!(html, "<a href=\"#\" class=\"UnderlineNav-item{selected}\">{tab}</a>");
    }
    html.push_str("</div></nav>\n");

    html.push_str("<div class=\"container-xl\">\n<div class=\"Layout\">\n<div class=\"Layout-main\">\n");

    // File table
    html.push_str("<details class=\"Box\" open>\n<summary class=\"Box-header\"><div class=\"Box-header-title\">");
    html.push_str(&escape_html(&page.dir_path));
    html.push_str("</div></summary>\n");
    html.push_str(&page.file_tree);
    html.push_str("\n</details>\n");

    // Document
    html.push_str("<article class=\"Box\" id=\"readme-ov-file\">\n<div class=\"Box-header\"><div class=\"Box-header-title\">");
    html.push_str(BOOK_ICON);
    html.push_str(&filename);
    html.push_str("</div></div>\n");
    html.push_str("<div class=\"markdown-body\">");
    html.push_str(&page.content);
    html.push_str("</div>\n</article>\n");

    html.push_str("</div>\n");

    render_sidebar(&mut html, page);

    html.push_str("</div>\n</div>\n");

    html.push_str("<script>");
    html.push_str(SCRIPTS);
    html.push_str("</script>\n");
    render_mermaid_init(&mut html);

    html.push_str("</body>\n</html>\n");
    html
}

fn render_header(html: &mut String) {
    html.push_str("<header class=\"AppHeader\">\n<div class=\"AppHeader-logo\">");
    html.push_str(GITHUB_MARK);
    html.push_str("</div>\n");
    html.push_str("<input type=\"text\" class=\"AppHeader-search\" placeholder=\"Search or jump to...\">\n");
    html.push_str("<nav class=\"AppHeader-nav\">");
    for item in ["Pull requests", "Issues", "Marketplace", "Explore"] {
        let _ = write!(html, "<a href=\"#\">{item}</a>");
    }
    html.push_str("<button class=\"dark-toggle\" id=\"darkToggle\" title=\"Toggle dark mode\">");
    html.push_str(SUN_ICON);
    html.push_str(MOON_ICON);
    html.push_str("</button></nav>\n</header>\n");
}

fn render_sidebar(html: &mut String, page: &PageData) {
    html.push_str("<div class=\"Layout-sidebar\">\n<div class=\"BorderGrid\">\n");

    html.push_str("<div class=\"BorderGrid-row\"><div class=\"BorderGrid-cell sidebar-about\">\n");
    html.push_str("<h2>About</h2>\n");
    let _ = writeln!(html, "<p>{}</p>", escape_html(&page.description));
    html.push_str("<div class=\"my-3\">");
    for topic in &page.topics {
        let _ = write!(html, "<a href=\"#\" class=\"topic-tag\">{}</a>", escape_html(topic));
    }
    html.push_str("</div>\n");
    html.push_str("<a class=\"sidebar-link\" href=\"#readme-ov-file\">");
    html.push_str(BOOK_ICON);
    html.push_str("Readme</a>\n");
    let _ = writeln!(html, "<a class=\"sidebar-link\" href=\"#\"><strong>{STARS}</strong> stars</a>");
    let _ = writeln!(html, "<a class=\"sidebar-link\" href=\"#\"><strong>{WATCHERS}</strong> watching</a>");
    let _ = writeln!(html, "<a class=\"sidebar-link\" href=\"#\"><strong>{FORKS}</strong> forks</a>");
    html.push_str("</div></div>\n");

    html.push_str("<div class=\"BorderGrid-row\"><div class=\"BorderGrid-cell\">\n");
    html.push_str("<h2>Languages</h2>\n");
    html.push_str("<div class=\"Progress\"><span class=\"Progress-item\" style=\"width: 100%; background-color: #083fa1;\"></span></div>\n");
    html.push_str("<ul class=\"lang-list\"><li class=\"lang-item\"><span class=\"lang-dot\" style=\"background-color: #083fa1;\"></span>");
    html.push_str("<span class=\"lang-name\">Markdown</span><span class=\"lang-percent\">100%</span></li></ul>\n");
    html.push_str("</div></div>\n");

    html.push_str("</div>\n</div>\n");
}

fn render_mermaid_init(html: &mut String) {
    html.push_str("<script type=\"module\">\n");
    let _ = writeln!(html, "import mermaid from '{MERMAID_MODULE_URL}';");
    html.push_str(
        "const darkMode = localStorage.getItem('dark') === 'true' ||\n  \
         (localStorage.getItem('dark') === null && window.matchMedia('(prefers-color-scheme: dark)').matches);\n\
         mermaid.initialize({ startOnLoad: true, theme: darkMode ? 'dark' : 'default' });\n\
         window.updateMermaidTheme = async (isDark) => {\n  \
         mermaid.initialize({ theme: isDark ? 'dark' : 'default' });\n  \
         const diagrams = document.querySelectorAll('.mermaid');\n  \
         for (const el of diagrams) {\n    \
         const code = el.getAttribute('data-mermaid-src') || el.textContent;\n    \
         el.setAttribute('data-mermaid-src', code);\n    \
         el.removeAttribute('data-processed');\n    \
         el.innerHTML = code;\n  \
         }\n  \
         await mermaid.run({ nodes: diagrams });\n\
         };\n",
    );
    html.push_str("</script>\n");
}
