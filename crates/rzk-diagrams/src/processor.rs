//! Per-page diagram pipeline.
//!
//! Two strategies drive the [`Checker`]:
//! - [`inject_cumulative`]: type-check the page snippet by snippet, each run
//!   seeing every earlier snippet, and place new diagrams before the snippet
//!   that produced them.
//! - [`inject_whole_page`]: type-check the page once and place each diagram
//!   before the block defining the name it was reported for.

use crate::blocks::extract_code_blocks;
use crate::checker::{CheckError, CheckInput, CheckOutput, Checker};
use crate::consts::CUMULATIVE_HEADER;
use crate::inject::{DiagramInjector, Injection};
use crate::page::Page;
use crate::svg::{extract_named_svgs, extract_svgs};

/// Result of processing one page.
#[derive(Debug)]
pub struct PageResult {
    /// Page Markdown with diagrams injected.
    pub markdown: String,
    /// Number of diagrams injected.
    pub injected: usize,
    /// Non-fatal problems worth surfacing to the operator.
    pub warnings: Vec<String>,
}

impl PageResult {
    fn unchanged(markdown: &str) -> Self {
        Self {
            markdown: markdown.to_owned(),
            injected: 0,
            warnings: Vec::new(),
        }
    }
}

/// Type-check snippets one at a time, accumulating earlier snippets so later
/// ones can use their definitions.
pub fn inject_cumulative<C: Checker + ?Sized>(
    checker: &C,
    markdown: &str,
    page: &Page,
) -> PageResult {
    let blocks = extract_code_blocks(markdown);
    if blocks.is_empty() {
        return PageResult::unchanged(markdown);
    }

    let mut history = vec![CUMULATIVE_HEADER.to_owned()];
    let mut injector = DiagramInjector::new();
    let mut warnings = Vec::new();

    for (index, block) in blocks.iter().enumerate() {
        history.push(block.snippet());
        let source = history.join("\n\n");

        let Some(output) = run_checker(
            checker,
            CheckInput::Source(&source),
            page,
            index,
            &mut warnings,
        ) else {
            continue;
        };

        // Each run re-renders the diagrams of all earlier snippets; only
        // fragments not seen before belong to this block.
        for svg in extract_svgs(&output.stderr) {
            injector.inject(block, svg);
        }
    }

    finish(injector, markdown, warnings)
}

/// Type-check the whole page in one run and place diagrams by definition name.
///
/// Uses the page's source file when the host provides one; otherwise the
/// Markdown is checked from a temporary copy.
pub fn inject_whole_page<C: Checker + ?Sized>(
    checker: &C,
    markdown: &str,
    page: &Page,
) -> PageResult {
    let blocks = extract_code_blocks(markdown);
    if blocks.is_empty() {
        return PageResult::unchanged(markdown);
    }

    let input = page
        .source_path()
        .map_or(CheckInput::Literate(markdown), CheckInput::File);
    let mut warnings = Vec::new();
    let Some(output) = run_checker(checker, input, page, 0, &mut warnings) else {
        return PageResult {
            warnings,
            ..PageResult::unchanged(markdown)
        };
    };

    let mut injector = DiagramInjector::new();
    for named in extract_named_svgs(&output.stderr) {
        if injector.inject_named(&blocks, named.name, named.svg) == Injection::AnchorNotFound {
            warnings.push(format!(
                "{}: no rzk code block defines '{}', diagram skipped",
                page.src_uri, named.name
            ));
        }
    }

    finish(injector, markdown, warnings)
}

fn finish(injector: DiagramInjector, markdown: &str, warnings: Vec<String>) -> PageResult {
    let injected = injector.len();
    PageResult {
        markdown: injector.apply(markdown),
        injected,
        warnings,
    }
}

/// Run one type-check, returning its output only when diagrams can be
/// trusted. Failures are logged or recorded as warnings, never propagated.
fn run_checker<C: Checker + ?Sized>(
    checker: &C,
    input: CheckInput<'_>,
    page: &Page,
    step: usize,
    warnings: &mut Vec<String>,
) -> Option<CheckOutput> {
    match checker.typecheck(input) {
        Ok(output) if output.success() => Some(output),
        Ok(output) => {
            tracing::debug!(
                page = %page.src_uri,
                step,
                exit_code = ?output.exit_code,
                "rzk typecheck failed:\n{}",
                output.stderr
            );
            None
        }
        Err(CheckError::Timeout(timeout)) => {
            warnings.push(format!(
                "{}: type-check skipped at step {step}, timed out after {timeout:?}",
                page.src_uri
            ));
            None
        }
        Err(e) => {
            warnings.push(format!("{}: type-check failed at step {step}: {e}", page.src_uri));
            None
        }
    }
}
