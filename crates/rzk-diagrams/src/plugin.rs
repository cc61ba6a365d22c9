//! Lifecycle hooks called by the documentation host.
//!
//! The host creates the plugin once through [`RzkPlugin::on_startup`], which
//! probes the type-checker, and then calls the [`DocsPlugin`] hooks once per
//! page. Nothing is shared between page calls except the immutable
//! [`Availability`] recorded at startup.

use std::borrow::Cow;

use crate::anchors::annotate_definitions;
use crate::checker::{Availability, Checker, RzkExecutable};
use crate::page::{HostCommand, Page};
use crate::processor::{PageResult, inject_cumulative, inject_whole_page};

/// How pages are fed to the type-checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckMode {
    /// One invocation per snippet over all snippets so far; diagrams are
    /// placed before the snippet that first produced them.
    #[default]
    Cumulative,
    /// One invocation per page; diagrams are placed by definition name.
    Page,
}

/// Switches controlling what the plugin does to each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginSettings {
    /// Inject SVG diagrams into page Markdown.
    pub render_svg: bool,
    /// Wrap definition names in the rendered HTML in anchors.
    pub anchor_definitions: bool,
    /// Type-checking strategy.
    pub mode: CheckMode,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            render_svg: true,
            anchor_definitions: true,
            mode: CheckMode::default(),
        }
    }
}

/// Page hooks of a documentation build plugin.
///
/// Hooks never fail: problems with one page are logged and the page is
/// returned as-is so the rest of the build can continue.
pub trait DocsPlugin {
    /// Called with the page source before it is rendered.
    fn on_page_markdown(&self, markdown: &str, page: &Page) -> String;

    /// Called with the rendered page body.
    fn on_page_content(&self, html: &str, page: &Page) -> String;
}

/// Diagram and anchor plugin for Literate Rzk pages.
#[derive(Debug)]
pub struct RzkPlugin<C = RzkExecutable> {
    settings: PluginSettings,
    checker: C,
    availability: Availability,
}

impl<C: Checker> RzkPlugin<C> {
    /// Start the plugin for a build, probing the checker once.
    ///
    /// When diagrams are disabled the checker is not probed and is treated
    /// as unavailable.
    pub fn on_startup(
        settings: PluginSettings,
        checker: C,
        command: HostCommand,
        dirty: bool,
    ) -> Self {
        tracing::debug!(%command, dirty, mode = ?settings.mode, "Starting rzk plugin");

        let availability = if settings.render_svg {
            tracing::info!("Checking if rzk is available (to render SVG diagrams)");
            let availability = checker.probe();
            if !availability.is_available() {
                tracing::warn!("rzk executable not found (will not generate diagrams)");
            }
            availability
        } else {
            Availability::Unavailable
        };

        Self::with_availability(settings, checker, availability)
    }

    /// Create a plugin with an availability determined elsewhere.
    #[must_use]
    pub fn with_availability(
        settings: PluginSettings,
        checker: C,
        availability: Availability,
    ) -> Self {
        Self {
            settings,
            checker,
            availability,
        }
    }

    #[must_use]
    pub fn availability(&self) -> Availability {
        self.availability
    }

    #[must_use]
    pub fn checker(&self) -> &C {
        &self.checker
    }

    /// Whether diagrams will be injected into `page`.
    #[must_use]
    pub fn renders(&self, page: &Page) -> bool {
        self.settings.render_svg && self.availability.is_available() && page.is_literate_rzk()
    }

    /// Inject diagrams into `markdown`, returning warnings instead of logging
    /// them.
    ///
    /// Pages that are not rendered come back unchanged.
    pub fn process_markdown(&self, markdown: &str, page: &Page) -> PageResult {
        if !self.renders(page) {
            return PageResult {
                markdown: markdown.to_owned(),
                injected: 0,
                warnings: Vec::new(),
            };
        }

        match self.settings.mode {
            CheckMode::Cumulative => inject_cumulative(&self.checker, markdown, page),
            CheckMode::Page => inject_whole_page(&self.checker, markdown, page),
        }
    }

    /// Annotate definition names in `html` when enabled for `page`.
    pub fn process_content<'a>(&self, html: &'a str, page: &Page) -> Cow<'a, str> {
        if !self.settings.anchor_definitions || !page.is_literate_rzk() {
            return Cow::Borrowed(html);
        }
        annotate_definitions(html)
    }
}

impl<C: Checker> DocsPlugin for RzkPlugin<C> {
    fn on_page_markdown(&self, markdown: &str, page: &Page) -> String {
        if !self.renders(page) {
            return markdown.to_owned();
        }

        tracing::info!("Inserting SVG diagrams in {}", page.src_uri);
        let result = self.process_markdown(markdown, page);
        for warning in &result.warnings {
            tracing::warn!("{warning}");
        }
        tracing::debug!(page = %page.src_uri, injected = result.injected, "Diagrams injected");
        result.markdown
    }

    fn on_page_content(&self, html: &str, page: &Page) -> String {
        self.process_content(html, page).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{CheckError, CheckInput, CheckOutput};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    /// Checker that always succeeds with the same diagnostics.
    struct StubChecker {
        availability: Availability,
        exit_code: i32,
        stderr: &'static str,
        calls: Cell<usize>,
        probes: Cell<usize>,
    }

    impl StubChecker {
        fn new(exit_code: i32, stderr: &'static str) -> Self {
            Self {
                availability: Availability::Available,
                exit_code,
                stderr,
                calls: Cell::new(0),
                probes: Cell::new(0),
            }
        }

        fn missing() -> Self {
            Self {
                availability: Availability::Unavailable,
                ..Self::new(0, "")
            }
        }
    }

    impl Checker for StubChecker {
        fn probe(&self) -> Availability {
            self.probes.set(self.probes.get() + 1);
            self.availability
        }

        fn typecheck(&self, _input: CheckInput<'_>) -> Result<CheckOutput, CheckError> {
            self.calls.set(self.calls.get() + 1);
            Ok(CheckOutput {
                exit_code: Some(self.exit_code),
                stderr: self.stderr.to_owned(),
            })
        }
    }

    const PAGE: &str = "# Squares\n\n```rzk\n#define square : U\n  := U\n```\n";
    const HTML: &str = r#"<span class="kd">#define</span> <span class="nf">square</span>"#;

    fn start(checker: StubChecker) -> RzkPlugin<StubChecker> {
        RzkPlugin::on_startup(PluginSettings::default(), checker, HostCommand::Build, false)
    }

    #[test]
    fn test_injects_svg_before_block() {
        let plugin = start(StubChecker::new(0, "<svg>sq</svg>\n"));
        let result = plugin.on_page_markdown(PAGE, &Page::new("squares.rzk.md"));

        assert_eq!(
            result,
            "# Squares\n\n<svg>sq</svg>\n\n```rzk\n#define square : U\n  := U\n```\n"
        );
        assert_eq!(result.matches("<svg>sq</svg>").count(), 1);
    }

    #[test]
    fn test_non_literate_page_untouched() {
        let plugin = start(StubChecker::new(0, "<svg>sq</svg>\n"));
        let page = Page::new("squares.md");

        assert_eq!(plugin.on_page_markdown(PAGE, &page), PAGE);
        assert_eq!(plugin.on_page_content(HTML, &page), HTML);
        assert_eq!(plugin.checker().calls.get(), 0);
    }

    #[test]
    fn test_unavailable_checker_is_noop() {
        let plugin = start(StubChecker::missing());

        assert_eq!(plugin.availability(), Availability::Unavailable);
        assert_eq!(
            plugin.on_page_markdown(PAGE, &Page::new("squares.rzk.md")),
            PAGE
        );
        assert_eq!(plugin.on_page_markdown(PAGE, &Page::new("squares.md")), PAGE);
        assert_eq!(plugin.checker().calls.get(), 0);
    }

    #[test]
    fn test_failed_typecheck_leaves_block() {
        let plugin = start(StubChecker::new(1, "<svg>sq</svg>\n"));

        assert_eq!(
            plugin.on_page_markdown(PAGE, &Page::new("squares.rzk.md")),
            PAGE
        );
    }

    #[test]
    fn test_render_svg_disabled_skips_probe() {
        let settings = PluginSettings {
            render_svg: false,
            ..PluginSettings::default()
        };
        let plugin = RzkPlugin::on_startup(
            settings,
            StubChecker::new(0, "<svg>sq</svg>\n"),
            HostCommand::Serve,
            true,
        );

        assert_eq!(plugin.checker().probes.get(), 0);
        assert_eq!(
            plugin.on_page_markdown(PAGE, &Page::new("squares.rzk.md")),
            PAGE
        );
    }

    #[test]
    fn test_probe_runs_once() {
        let plugin = start(StubChecker::new(0, "<svg>sq</svg>\n"));
        let page = Page::new("squares.rzk.md");

        plugin.on_page_markdown(PAGE, &page);
        plugin.on_page_markdown(PAGE, &page);

        assert_eq!(plugin.checker().probes.get(), 1);
        assert_eq!(plugin.checker().calls.get(), 2);
    }

    #[test]
    fn test_page_mode_uses_named_diagrams() {
        let settings = PluginSettings {
            mode: CheckMode::Page,
            ..PluginSettings::default()
        };
        let checker = StubChecker::new(
            0,
            "[ 1 out of 1 ] Checking #define square\n<svg>sq</svg>\n",
        );
        let plugin = RzkPlugin::on_startup(settings, checker, HostCommand::Build, false);

        let result = plugin.process_markdown(PAGE, &Page::new("squares.rzk.md"));

        assert_eq!(result.injected, 1);
        assert!(result.markdown.contains("<svg>sq</svg>\n\n```rzk\n#define square"));
    }

    #[test]
    fn test_anchor_annotation() {
        let plugin = start(StubChecker::new(0, ""));
        let result = plugin.on_page_content(HTML, &Page::new("squares.rzk.md"));

        assert!(result.contains(r##"<a href="#define:square" id="define:square""##));
        assert!(result.contains(">square</a></span>"));
    }

    #[test]
    fn test_anchor_annotation_without_rzk() {
        let plugin = start(StubChecker::missing());
        let page = Page::new("squares.rzk.md");

        assert_eq!(plugin.availability(), Availability::Unavailable);
        assert_eq!(plugin.on_page_markdown(PAGE, &page), PAGE);
        let result = plugin.on_page_content(HTML, &page);
        assert!(result.contains(r##"<a href="#define:square" id="define:square""##));
        assert_eq!(plugin.on_page_content(HTML, &Page::new("squares.md")), HTML);
    }

    #[test]
    fn test_anchor_annotation_disabled() {
        let settings = PluginSettings {
            anchor_definitions: false,
            ..PluginSettings::default()
        };
        let plugin = RzkPlugin::on_startup(
            settings,
            StubChecker::new(0, ""),
            HostCommand::Build,
            false,
        );

        assert_eq!(
            plugin.on_page_content(HTML, &Page::new("squares.rzk.md")),
            HTML
        );
    }
}
