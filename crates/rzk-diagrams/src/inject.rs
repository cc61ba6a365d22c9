//! Textual injection of diagrams in front of their code blocks.
//!
//! Edits are recorded against byte offsets of the original page source and
//! applied in a single pass, so recording one diagram never shifts the anchor
//! of another.

use std::collections::HashSet;

use crate::blocks::CodeBlock;

/// Outcome of offering one diagram to the injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    /// The diagram will be inserted before its block.
    Inserted,
    /// An identical diagram was already placed; nothing to do.
    Duplicate,
    /// No code block owns the diagram.
    AnchorNotFound,
}

/// Collects diagram insertions for one page.
#[derive(Debug, Default)]
pub struct DiagramInjector {
    /// `(block offset, fragment)` in the order diagrams were accepted.
    insertions: Vec<(usize, String)>,
    /// Fragments placed anywhere on the page by [`Self::inject`].
    seen: HashSet<String>,
    /// `(block offset, fragment)` pairs placed by [`Self::inject_named`].
    placed: HashSet<(usize, String)>,
}

impl DiagramInjector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `svg` before `block` unless the same fragment was already
    /// injected anywhere on this page.
    pub fn inject(&mut self, block: &CodeBlock<'_>, svg: &str) -> Injection {
        if !self.seen.insert(svg.to_owned()) {
            return Injection::Duplicate;
        }
        self.insertions.push((block.offset, svg.to_owned()));
        Injection::Inserted
    }

    /// Place `svg` before the first block defining `name`.
    ///
    /// The owning block is the first one whose code contains `name` as a
    /// whitespace-delimited token. A fragment is placed at most once per
    /// block.
    pub fn inject_named(&mut self, blocks: &[CodeBlock<'_>], name: &str, svg: &str) -> Injection {
        let Some(block) = blocks.iter().find(|block| block.mentions(name)) else {
            return Injection::AnchorNotFound;
        };
        if !self.placed.insert((block.offset, svg.to_owned())) {
            return Injection::Duplicate;
        }
        self.insertions.push((block.offset, svg.to_owned()));
        Injection::Inserted
    }

    /// Number of diagrams accepted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.insertions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
    }

    /// Apply all insertions to `source`.
    ///
    /// Each fragment is followed by a blank line. Fragments targeting the
    /// same block keep the order in which they were accepted.
    #[must_use]
    pub fn apply(mut self, source: &str) -> String {
        if self.insertions.is_empty() {
            return source.to_owned();
        }

        // Stable sort keeps acceptance order for a shared offset.
        self.insertions.sort_by_key(|(offset, _)| *offset);

        let extra: usize = self.insertions.iter().map(|(_, svg)| svg.len() + 2).sum();
        let mut result = String::with_capacity(source.len() + extra);
        let mut last = 0;
        for (offset, svg) in &self.insertions {
            result.push_str(&source[last..*offset]);
            result.push_str(svg);
            result.push_str("\n\n");
            last = *offset;
        }
        result.push_str(&source[last..]);
        result
    }
}
