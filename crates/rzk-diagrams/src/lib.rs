//! SVG diagrams and definition anchors for Literate Rzk documentation.
//!
//! This crate post-processes `*.rzk.md` pages for a documentation host:
//! - [`RzkPlugin`] implements the [`DocsPlugin`] page hooks
//! - Type-checking through the external `rzk` executable ([`RzkExecutable`])
//! - SVG extraction from the checker's diagnostic stream
//! - Textual injection of each diagram before the code block it belongs to
//! - Anchor links for definition names in the rendered HTML
//!
//! # Architecture
//!
//! The crate is organized into modules:
//! - [`blocks`]: ```` ```rzk ```` fenced block extraction
//! - [`checker`]: the [`Checker`] seam and the `rzk` subprocess
//! - [`svg`]: SVG fragments, optionally keyed by definition name
//! - [`inject`]: single-pass insertion with de-duplication
//! - [`anchors`]: `define:<name>` anchors in rendered HTML
//! - [`processor`]: cumulative and whole-page pipelines
//! - [`plugin`]: lifecycle hooks and settings
//!
//! # Example
//!
//! ```no_run
//! use rzk_diagrams::{DocsPlugin, HostCommand, Page, PluginSettings, RzkExecutable, RzkPlugin};
//!
//! let plugin = RzkPlugin::on_startup(
//!     PluginSettings::default(),
//!     RzkExecutable::new("rzk"),
//!     HostCommand::Build,
//!     false,
//! );
//!
//! let page = Page::new("hott/01-paths.rzk.md");
//! let markdown = "```rzk\n#define idpath : U\n  := U\n```\n";
//! let with_diagrams = plugin.on_page_markdown(markdown, &page);
//! ```

pub mod anchors;
pub mod blocks;
pub mod checker;
mod consts;
pub mod inject;
mod page;
pub mod plugin;
pub mod processor;
pub mod svg;

pub use anchors::annotate_definitions;
pub use blocks::{CodeBlock, extract_code_blocks};
pub use checker::{
    Availability, CheckError, CheckInput, CheckOutput, Checker, RzkExecutable, SnippetInput,
};
pub use consts::{DEFAULT_RZK_PATH, LITERATE_SUFFIX};
pub use page::{HostCommand, Page};
pub use plugin::{CheckMode, DocsPlugin, PluginSettings, RzkPlugin};
pub use processor::PageResult;
