//! `rzk-docs html` command implementation.

use std::path::PathBuf;

use clap::Args;
use rzk_diagrams::{Availability, DocsPlugin, Page, RzkExecutable, RzkPlugin};

use super::{ConfigArgs, read_input, settings_from_config, write_output};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the html command.
#[derive(Args)]
pub(crate) struct HtmlArgs {
    /// Rendered page HTML file, or `-` to read stdin.
    file: PathBuf,

    /// Identifier of the page the HTML was rendered from (e.g. `hott/01-paths.rzk.md`).
    #[arg(long)]
    page: String,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

impl HtmlArgs {
    /// Run the page-content hook on one rendered page.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the page cannot be read or
    /// written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = self.config.load()?;
        let html = read_input(&self.file)?;

        // Annotation does not need the type-checker, so skip the probe.
        let plugin = RzkPlugin::with_availability(
            settings_from_config(&config),
            RzkExecutable::new(&config.rzk.path),
            Availability::Unavailable,
        );
        let result = plugin.on_page_content(&html, &Page::new(self.page));

        write_output(self.output.as_deref(), &result)?;
        if let Some(path) = &self.output {
            Output::new().success(&format!("Wrote {}", path.display()));
        }
        Ok(())
    }
}
