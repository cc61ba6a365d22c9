//! Linkable anchors for definition names in rendered HTML.
//!
//! Syntax highlighters mark the name of a definition with
//! `<span class="nf">`. Wrapping its text in an anchor lets other pages link
//! to `#define:<name>`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::consts::DEFINE_ANCHOR_PREFIX;

/// A definition-name span whose content is plain text. Already annotated
/// spans contain markup and never match.
static DEFINITION_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span class="nf">([^<]+)</span>"#).unwrap());

/// Keeps the anchor visually identical to the surrounding code.
const ANCHOR_STYLE: &str = "color: inherit; text-decoration: inherit;";

/// Wrap the text of every definition-name span in a `define:<name>` anchor.
///
/// Returns the input unchanged (borrowed) when there is nothing to annotate.
#[must_use]
pub fn annotate_definitions(html: &str) -> Cow<'_, str> {
    DEFINITION_SPAN.replace_all(html, |caps: &Captures<'_>| {
        let name = &caps[1];
        format!(
            r##"<span class="nf"><a href="#{DEFINE_ANCHOR_PREFIX}{name}" id="{DEFINE_ANCHOR_PREFIX}{name}" style="{ANCHOR_STYLE}">{name}</a></span>"##
        )
    })
}
