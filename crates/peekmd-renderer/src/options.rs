/// Parser configuration.
///
/// Line breaks on single newlines are always off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParserOptions {
    /// Pass raw HTML through; when off, HTML is rendered as escaped text.
    pub html: bool,
    /// Turn bare URLs in text into links.
    pub linkify: bool,
    /// Smart quotes and dashes.
    pub typographer: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            html: true,
            linkify: true,
            typographer: false,
        }
    }
}
