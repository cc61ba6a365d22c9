//! `rzk-docs markdown` command implementation.

use std::path::PathBuf;

use clap::Args;
use rzk_diagrams::{DocsPlugin, Page};

use super::{ConfigArgs, is_stdin, read_input, start_plugin, write_output};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the markdown command.
#[derive(Args)]
pub(crate) struct MarkdownArgs {
    /// Page Markdown file, or `-` to read stdin.
    file: PathBuf,

    /// Page identifier (default: FILE relative to the source directory).
    #[arg(long)]
    page: Option<String>,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    config: ConfigArgs,
}

impl MarkdownArgs {
    /// Run the page-markdown hook on one page.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the page cannot be read or
    /// written. Type-check problems are logged, not returned.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = self.config.load()?;
        let markdown = read_input(&self.file)?;

        let page = if is_stdin(&self.file) {
            let src_uri = self.page.ok_or_else(|| {
                CliError::Validation("--page is required when reading from stdin".to_owned())
            })?;
            Page::new(src_uri)
        } else {
            let abs_path = std::path::absolute(&self.file)?;
            let src_uri = self.page.unwrap_or_else(|| config.page_id(&abs_path));
            Page::new(src_uri).with_source_path(abs_path)
        };

        tracing::debug!(page = %page.src_uri, file = %self.file.display(), "Processing page");
        let plugin = start_plugin(&config);
        let result = plugin.on_page_markdown(&markdown, &page);

        write_output(self.output.as_deref(), &result)?;
        if let Some(path) = &self.output {
            Output::new().success(&format!("Wrote {}", path.display()));
        }
        Ok(())
    }
}
