use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use courier_core::InputKind;

/// Command-line arguments for the courier task router.
#[derive(Debug, Parser)]
#[command(name = "courier", version, about = "Route tasks to capability providers")]
pub struct Cli {
    /// Path to a config file; defaults to `~/.courier/config.toml`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the catalog JSON; overrides the configured path.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Input modality accepted on the command line.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum InputTypeArg {
    /// Plain text input.
    #[default]
    Text,
    /// Image input.
    Image,
    /// Structured JSON input.
    Structured,
}

impl From<InputTypeArg> for InputKind {
    fn from(value: InputTypeArg) -> Self {
        match value {
            InputTypeArg::Text => Self::Text,
            InputTypeArg::Image => Self::Image,
            InputTypeArg::Structured => Self::Structured,
        }
    }
}

/// Courier subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Route and dispatch a single task.
    Run {
        /// Task input text.
        input: String,

        /// Input modality.
        #[arg(long, value_enum, default_value = "text")]
        input_type: InputTypeArg,

        /// Pin the task to an explicit service id.
        #[arg(long)]
        service: Option<String>,

        /// Explicit language tag; wins over detection.
        #[arg(long)]
        language: Option<String>,
    },

    /// Dispatch a batch of tasks from a JSON file.
    Batch {
        /// Path to a JSON array of task requests.
        file: PathBuf,
    },

    /// List registered services and categories.
    Services,

    /// Health-check a single provider.
    Check {
        /// Service id to check.
        service_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_service() {
        let cli = match Cli::try_parse_from([
            "courier",
            "run",
            "Write a function",
            "--service",
            "svc-code",
        ]) {
            Ok(cli) => cli,
            Err(error) => panic!("parse failed: {error}"),
        };

        match cli.command {
            Command::Run { input, service, .. } => {
                assert_eq!(input, "Write a function");
                assert_eq!(service.as_deref(), Some("svc-code"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_check() {
        let cli = match Cli::try_parse_from(["courier", "check", "svc-a"]) {
            Ok(cli) => cli,
            Err(error) => panic!("parse failed: {error}"),
        };

        assert!(matches!(cli.command, Command::Check { .. }));
    }

    #[test]
    fn test_input_type_conversion() {
        assert_eq!(InputKind::from(InputTypeArg::Image), InputKind::Image);
        assert_eq!(InputKind::from(InputTypeArg::Text), InputKind::Text);
    }
}
