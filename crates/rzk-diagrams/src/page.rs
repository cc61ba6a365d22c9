//! Page identity passed in by the documentation host.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::consts::LITERATE_SUFFIX;

/// Identity of the page currently being processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Path-like key of the page relative to the docs directory
    /// (e.g. `hott/01-paths.rzk.md`).
    pub src_uri: String,
    /// Absolute path of the page source on disk, when the host has one.
    pub abs_src_path: Option<PathBuf>,
}

impl Page {
    /// Create a page known only by its identifier.
    #[must_use]
    pub fn new(src_uri: impl Into<String>) -> Self {
        Self {
            src_uri: src_uri.into(),
            abs_src_path: None,
        }
    }

    /// Attach the on-disk source path.
    #[must_use]
    pub fn with_source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.abs_src_path = Some(path.into());
        self
    }

    /// Whether this page is a Literate Rzk document (`*.rzk.md`).
    #[must_use]
    pub fn is_literate_rzk(&self) -> bool {
        self.src_uri.ends_with(LITERATE_SUFFIX)
    }

    /// On-disk source path, if any.
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.abs_src_path.as_deref()
    }
}

/// Host command the documentation build was started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostCommand {
    /// One-off site build.
    #[default]
    Build,
    /// Build and publish to GitHub Pages.
    GhDeploy,
    /// Development server with rebuilds on change.
    Serve,
}

impl HostCommand {
    /// Command name as the host spells it.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::GhDeploy => "gh-deploy",
            Self::Serve => "serve",
        }
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
