//! Internal constants for diagram injection.

/// Suffix identifying Literate Rzk pages.
pub const LITERATE_SUFFIX: &str = ".rzk.md";

/// Language directive stripped from snippets before they are accumulated.
pub const LANG_DIRECTIVE: &str = "#lang rzk-1";

/// Header prepended to the accumulated snippets so that `rzk` emits SVG.
pub const CUMULATIVE_HEADER: &str = "#lang rzk-1\n#set-option \"render\" = \"svg\"\n";

/// Subcommand used for every type-checker invocation.
pub const TYPECHECK_SUBCOMMAND: &str = "typecheck";

/// Default executable name, resolved through `PATH`.
pub const DEFAULT_RZK_PATH: &str = "rzk";

/// Anchor prefix for definition links (`#define:<name>`).
pub const DEFINE_ANCHOR_PREFIX: &str = "define:";
