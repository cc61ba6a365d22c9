//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod html;
pub(crate) mod markdown;

pub(crate) use check::CheckArgs;
pub(crate) use html::HtmlArgs;
pub(crate) use markdown::MarkdownArgs;

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use rzk_config::{CliSettings, Config, Input, Mode};
use rzk_diagrams::{
    CheckMode, HostCommand, PluginSettings, RzkExecutable, RzkPlugin, SnippetInput,
};

use crate::error::CliError;

/// Page argument value meaning "read from stdin".
const STDIN_ARG: &str = "-";

/// Configuration arguments shared by all commands.
#[derive(Args)]
pub(crate) struct ConfigArgs {
    /// Path to configuration file (default: auto-discover rzk-docs.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Documentation source directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Path to the rzk executable (overrides config).
    #[arg(long)]
    rzk_path: Option<String>,

    /// Type-checking mode: cumulative or page (overrides config).
    #[arg(long)]
    mode: Option<Mode>,

    /// Type-check timeout in seconds (overrides config).
    #[arg(long)]
    timeout: Option<u64>,

    /// Disable SVG diagram injection.
    #[arg(long)]
    no_render_svg: bool,

    /// Disable definition anchors.
    #[arg(long)]
    no_anchor_definitions: bool,
}

impl ConfigArgs {
    /// Load configuration with these arguments applied on top.
    pub(crate) fn load(&self) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            rzk_path: self.rzk_path.clone(),
            render_svg: self.no_render_svg.then_some(false),
            anchor_definitions: self.no_anchor_definitions.then_some(false),
            mode: self.mode,
            timeout_secs: self.timeout,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Build the `rzk` checker described by `config`.
pub(crate) fn checker_from_config(config: &Config) -> RzkExecutable {
    let input = match config.rzk.input {
        Input::Stdin => SnippetInput::Stdin,
        Input::File => SnippetInput::TempFile,
    };
    RzkExecutable::new(&config.rzk.path)
        .input(input)
        .timeout(config.rzk.timeout())
}

/// Plugin settings described by `config`.
pub(crate) fn settings_from_config(config: &Config) -> PluginSettings {
    PluginSettings {
        render_svg: config.rzk.render_svg,
        anchor_definitions: config.rzk.anchor_definitions,
        mode: match config.rzk.mode {
            Mode::Cumulative => CheckMode::Cumulative,
            Mode::Page => CheckMode::Page,
        },
    }
}

/// Start the plugin the way a documentation host would.
pub(crate) fn start_plugin(config: &Config) -> RzkPlugin {
    RzkPlugin::on_startup(
        settings_from_config(config),
        checker_from_config(config),
        HostCommand::Build,
        false,
    )
}

/// Read page content from `path`, or from stdin when `path` is `-`.
pub(crate) fn read_input(path: &Path) -> Result<String, CliError> {
    if path.as_os_str() == STDIN_ARG {
        let mut content = String::new();
        std::io::stdin().lock().read_to_string(&mut content)?;
        return Ok(content);
    }
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Whether `path` designates stdin.
pub(crate) fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN_ARG
}

/// Write processed content to `output`, or to stdout when not given.
pub(crate) fn write_output(output: Option<&Path>, content: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, content)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config_from(toml: &str) -> Config {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rzk-docs.toml");
        std::fs::write(&path, toml).unwrap();
        Config::load(Some(&path), None).unwrap()
    }

    #[test]
    fn test_settings_from_config() {
        let config = config_from("[rzk]\nrender_svg = false\nmode = \"page\"\n");
        let settings = settings_from_config(&config);

        assert!(!settings.render_svg);
        assert!(settings.anchor_definitions);
        assert_eq!(settings.mode, CheckMode::Page);
    }

    #[test]
    fn test_checker_from_config() {
        let config = config_from("[rzk]\npath = \"/opt/rzk\"\ninput = \"file\"\n");
        let checker = checker_from_config(&config);

        assert_eq!(checker.path(), Path::new("/opt/rzk"));
    }

    #[test]
    fn test_start_plugin_with_missing_rzk() {
        let config = config_from("[rzk]\npath = \"/nonexistent/rzk-docs-cli/rzk\"\n");
        let plugin = start_plugin(&config);

        assert!(!plugin.availability().is_available());
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.md");

        write_output(Some(&path), "# Page\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Page\n");
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Path::new("/nonexistent/page.rzk.md")).unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/page.rzk.md"));
    }

    #[test]
    fn test_is_stdin() {
        assert!(is_stdin(Path::new("-")));
        assert!(!is_stdin(Path::new("page.rzk.md")));
    }
}
