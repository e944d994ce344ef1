//! Toolbelt CLI
//!
//! Command-line interface for the Toolbelt utility library.
//!
//! # Usage
//!
//! ```bash
//! toolbelt --help
//! toolbelt calc divide 12 3
//! toolbelt stats 1 2 3 4 5 6
//! toolbelt save data.json '{"key": "value"}'
//! toolbelt load data.json
//! ```

#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use shared::arithmetic::Calculator;
use shared::config::Settings;
use shared::logging::FileCallLogger;
use shared::persistence::JsonFile;
use shared::retry::Retry;
use shared::stats;
use std::path::PathBuf;

/// Toolbelt CLI - arithmetic, statistics and JSON file utilities
#[derive(Parser)]
#[command(name = "toolbelt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Call log file (overrides TOOLBELT_LOG_FILE)
    #[arg(short, long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply an arithmetic operation to two numbers
    Calc {
        /// Operation to apply
        #[arg(value_enum)]
        op: Operation,
        /// Left operand
        #[arg(allow_negative_numbers = true)]
        a: f64,
        /// Right operand
        #[arg(allow_negative_numbers = true)]
        b: f64,
    },
    /// Print mean, median and standard deviation of the given numbers
    Stats {
        /// Only keep strictly positive values
        #[arg(long)]
        positive: bool,
        /// Input values
        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },
    /// Save a JSON object to a file, replacing its content
    Save {
        /// Target file
        path: PathBuf,
        /// JSON object text
        json: String,
    },
    /// Load a JSON object from a file, retrying per TOOLBELT_MAX_RETRIES
    Load {
        /// Source file
        path: PathBuf,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Calc { .. } => "calc",
            Self::Stats { .. } => "stats",
            Self::Save { .. } => "save",
            Self::Load { .. } => "load",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::from_env().context("Failed to load settings")?;
    if let Some(log_file) = cli.log_file {
        settings.log_file = log_file;
    }

    match cli.command {
        Some(command) => {
            let output = execute(command, &settings)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        None => {
            println!("Toolbelt CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn execute(command: Commands, settings: &Settings) -> Result<Value> {
    let logger = FileCallLogger::new(&settings.log_file);
    tracing::info!(
        command = command.name(),
        log_file = %settings.log_file.display(),
        "executing command"
    );

    match command {
        Commands::Calc { op, a, b } => {
            let mut calc = Calculator::with_initial_value(a, &logger);
            let result = match op {
                Operation::Add => calc.add(b),
                Operation::Subtract => calc.subtract(b),
                Operation::Multiply => calc.multiply(b),
                Operation::Divide => calc.divide(b)?,
            };
            Ok(json!(result))
        }
        Commands::Stats { positive, values } => {
            let values = if positive {
                stats::filter_positive(&values)
            } else {
                values
            };
            let summary = stats::summarize(&values)?;
            Ok(serde_json::to_value(summary)?)
        }
        Commands::Save { path, json } => {
            let Value::Object(document) =
                serde_json::from_str::<Value>(&json).context("Argument is not valid JSON")?
            else {
                bail!("Argument must be a JSON object");
            };
            JsonFile::new(path, &logger).write(&document)?;
            Ok(Value::Object(document))
        }
        Commands::Load { path } => {
            let file = JsonFile::new(path, &logger);
            let mut retry = Retry::new(settings.retry)?;
            let document = retry.run("load", || file.read())?;
            Ok(Value::Object(document))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings(name: &str) -> Settings {
        Settings {
            log_file: std::env::temp_dir().join(format!(
                "toolbelt-cli-{}-{name}.log",
                std::process::id()
            )),
            ..Settings::default()
        }
    }

    #[test]
    fn test_cli_parse() {
        // Verify CLI can parse without arguments
        let cli = Cli::try_parse_from(["toolbelt"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_calc_command() {
        let cli = Cli::try_parse_from(["toolbelt", "calc", "divide", "-3", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Calc {
                op: Operation::Divide,
                ..
            })
        ));
    }

    #[test]
    fn test_cli_stats_requires_values() {
        assert!(Cli::try_parse_from(["toolbelt", "stats"]).is_err());
    }

    #[test]
    fn test_command_names() {
        let cli = Cli::try_parse_from(["toolbelt", "load", "data.json"]).unwrap();
        assert_eq!(cli.command.map(|c| c.name()), Some("load"));

        let cli = Cli::try_parse_from(["toolbelt", "stats", "1", "2"]).unwrap();
        assert_eq!(cli.command.map(|c| c.name()), Some("stats"));
    }

    #[test]
    fn test_execute_calc() {
        let settings = test_settings("calc");
        let output = execute(
            Commands::Calc {
                op: Operation::Multiply,
                a: 3.0,
                b: 4.0,
            },
            &settings,
        )
        .unwrap();
        assert_eq!(output, json!(12.0));

        let err = execute(
            Commands::Calc {
                op: Operation::Divide,
                a: 1.0,
                b: 0.0,
            },
            &settings,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Cannot divide by zero");

        std::fs::remove_file(&settings.log_file).unwrap();
    }

    #[test]
    fn test_execute_stats() {
        let settings = test_settings("stats");
        let output = execute(
            Commands::Stats {
                positive: true,
                values: vec![-1.0, 0.0, 2.0, 4.0],
            },
            &settings,
        )
        .unwrap();
        assert_eq!(output["mean"], json!(3.0));
        assert_eq!(output["median"], json!(3.0));

        let err = execute(
            Commands::Stats {
                positive: true,
                values: vec![-1.0],
            },
            &settings,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Input sequence is empty");
    }

    #[test]
    fn test_execute_save_and_load() {
        let settings = test_settings("files");
        let path = std::env::temp_dir().join(format!(
            "toolbelt-cli-{}-doc.json",
            std::process::id()
        ));

        let saved = execute(
            Commands::Save {
                path: path.clone(),
                json: r#"{"key": "value"}"#.to_string(),
            },
            &settings,
        )
        .unwrap();
        let loaded = execute(Commands::Load { path: path.clone() }, &settings).unwrap();
        assert_eq!(saved, loaded);
        assert_eq!(loaded, json!({"key": "value"}));

        let rejected = execute(
            Commands::Save {
                path: path.clone(),
                json: "[1, 2]".to_string(),
            },
            &settings,
        );
        assert!(rejected.is_err());

        std::fs::remove_file(&path).unwrap();
        std::fs::remove_file(&settings.log_file).unwrap();
    }
}
