//! Extraction of ```` ```rzk ```` fenced code blocks from page Markdown.

use std::sync::LazyLock;

use regex::Regex;

use crate::consts::LANG_DIRECTIVE;

/// Fenced `rzk` block, tolerating qualifiers after the language tag
/// (```` ```rzk {.numberLines} ````, ```` ```rzk-1 ````).
static RZK_CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)(^```\s*rzk[^\n]*\s+(.*?)\s+^```)").unwrap());

/// A fenced `rzk` code block found in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock<'a> {
    /// Full fenced block text, from the opening fence to the closing fence.
    pub fenced: &'a str,
    /// Inner code, without the fences and surrounding whitespace.
    pub code: &'a str,
    /// Byte offset of the fenced block in the page source.
    pub offset: usize,
}

impl CodeBlock<'_> {
    /// Snippet body with the language directive removed.
    #[must_use]
    pub fn snippet(&self) -> String {
        self.code.replace(LANG_DIRECTIVE, "")
    }

    /// Whether `name` appears in the code as a whitespace-delimited token.
    #[must_use]
    pub fn mentions(&self, name: &str) -> bool {
        self.code.split_whitespace().any(|token| token == name)
    }
}

/// Extract all `rzk` code blocks from `markdown` in document order.
#[must_use]
pub fn extract_code_blocks(markdown: &str) -> Vec<CodeBlock<'_>> {
    RZK_CODE_BLOCK
        .captures_iter(markdown)
        .filter_map(|caps| {
            let fenced = caps.get(1)?;
            let code = caps.get(2)?;
            Some(CodeBlock {
                fenced: fenced.as_str(),
                code: code.as_str(),
                offset: fenced.start(),
            })
        })
        .collect()
}
