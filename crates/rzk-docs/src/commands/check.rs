//! `rzk-docs check` command implementation.

use clap::Args;
use rzk_diagrams::Checker;

use super::{ConfigArgs, checker_from_config};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    config: ConfigArgs,
}

impl CheckArgs {
    /// Probe the configured `rzk` executable.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the executable cannot be launched.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.config.load()?;
        let checker = checker_from_config(&config);

        output.info(&format!("rzk path: {}", checker.path().display()));
        output.info(&format!("Mode: {}", config.rzk.mode));
        if !config.rzk.render_svg {
            output.warning("Diagram rendering: disabled");
        }
        if !config.rzk.anchor_definitions {
            output.warning("Definition anchors: disabled");
        }

        if !checker.probe().is_available() {
            return Err(CliError::Unavailable(checker.path().to_path_buf()));
        }

        output.success("rzk is available");
        Ok(())
    }
}
