//! SVG fragment extraction from `rzk typecheck` diagnostics.
//!
//! `rzk` prints rendered diagrams as literal `<svg>…</svg>` blocks on its
//! diagnostic stream. In whole-page mode every definition is preceded by a
//! progress marker such as `[ 3 out of 12 ] Checking #define is-contr`, which
//! is used to pair each diagram with the definition that produced it.

use std::sync::LazyLock;

use regex::Regex;

static SVG_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^(<svg.*?</svg>)").unwrap());

static CHECKING_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\[\s*\d+\s+out\s+of\s+\d+\s*\]\s+Checking\s+#def(?:ine)?\s+(\S+)").unwrap()
});

/// A diagram keyed by the definition that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSvg<'a> {
    /// Definition name from the `Checking #define` marker.
    pub name: &'a str,
    /// SVG fragment.
    pub svg: &'a str,
}

/// Extract every line-anchored SVG fragment in order of appearance.
#[must_use]
pub fn extract_svgs(output: &str) -> Vec<&str> {
    SVG_ELEMENT
        .captures_iter(output)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Extract SVG fragments paired with the definition name that preceded them.
///
/// Each marker owns the text up to the next marker (or the end of the
/// stream); the first SVG in that section belongs to the definition.
/// Definitions that rendered nothing are skipped.
#[must_use]
pub fn extract_named_svgs(output: &str) -> Vec<NamedSvg<'_>> {
    let markers: Vec<_> = CHECKING_MARKER
        .captures_iter(output)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some((whole.start(), whole.end(), name.as_str()))
        })
        .collect();

    markers
        .iter()
        .enumerate()
        .filter_map(|(i, &(_, body_start, name))| {
            let body_end = markers
                .get(i + 1)
                .map_or(output.len(), |&(next_start, _, _)| next_start);
            let section = &output[body_start..body_end];
            let svg = SVG_ELEMENT.captures(section)?.get(1)?.as_str();
            Some(NamedSvg { name, svg })
        })
        .collect()
}
