use crate::code_block::{CodeBlockProcessor, FenceInfo, ProcessResult};

/// Fence language rendered client-side by mermaid.js.
pub const MERMAID_LANGUAGE: &str = "mermaid";

/// Emits `mermaid` fences as raw diagram source for client-side rendering.
///
/// The source is not escaped: arrows such as `-->` must reach mermaid.js as written.
#[derive(Clone, Copy, Debug, Default)]
pub struct MermaidProcessor;

impl CodeBlockProcessor for MermaidProcessor {
    fn process(&self, fence: &FenceInfo, source: &str) -> ProcessResult {
        if fence.raw == MERMAID_LANGUAGE {
            ProcessResult::Inline(format!("<pre class=\"mermaid\">{}</pre>\n", source.trim()))
        } else {
            ProcessResult::PassThrough
        }
    }
}
