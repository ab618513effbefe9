use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::blocks::ExtensionRegistry;
use crate::config::{Config, CONFIG_PATH_ENV};
use crate::execution::{
    DebugConfig, DebugGranularity, DebugTargets, RuntimeParameterProvider, TracingLogger,
};
use crate::model::{load_model, Model};
use crate::pipeline::{interpret_model, InterpreterExitCode, InterpreterOptions};
use crate::valuetypes::{sql::sql_column_type, ValueType};

#[derive(Parser)]
#[command(name = "conduit")]
#[command(about = "Conduit - an interpreter for declarative data pipelines", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Log level filter (overrides config file and env vars)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a model and run all of its pipelines
    Run {
        /// Model document (.json or .toml)
        model: PathBuf,

        /// Runtime parameter, repeatable
        #[arg(short = 'e', long = "env", value_name = "NAME=VALUE")]
        env: Vec<String>,

        /// Log block boundaries and outputs
        #[arg(long)]
        debug: bool,

        /// How much of each output to log
        #[arg(long, value_enum)]
        debug_granularity: Option<DebugGranularity>,

        /// Only debug this block, repeatable
        #[arg(long = "debug-target", value_name = "BLOCK")]
        debug_targets: Vec<String>,
    },

    /// Validate a model without running it
    Check {
        /// Model document (.json or .toml)
        model: PathBuf,

        /// Runtime parameter, repeatable
        #[arg(short = 'e', long = "env", value_name = "NAME=VALUE")]
        env: Vec<String>,
    },

    /// List the model's value types and their SQL column types
    Types {
        /// Model document (.json or .toml)
        model: PathBuf,
    },
}

/// Run the CLI by parsing process arguments
pub async fn run_cli() -> Result<InterpreterExitCode> {
    let cli = Cli::parse();
    run_cli_with_args(cli).await
}

/// Run the CLI with an explicit argument list
pub async fn run_cli_from_args(args: Vec<String>) -> Result<InterpreterExitCode> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli).await
}

async fn run_cli_with_args(cli: Cli) -> Result<InterpreterExitCode> {
    // Apply CLI overrides to environment before loading configuration
    if let Some(config_path) = &cli.config {
        std::env::set_var(CONFIG_PATH_ENV, config_path);
    }

    // Eagerly load and validate configuration before executing any command
    let config = Config::builder()
        .log_level(cli.log_level.clone())
        .build()
        .context("Failed to load configuration")?;
    crate::logging::init(&config.log_level);

    let extensions = ExtensionRegistry::std().context("Failed to register standard library")?;

    match cli.command {
        Commands::Run {
            model,
            env,
            debug,
            debug_granularity,
            debug_targets,
        } => {
            let model = read_model(&model).await?;
            let options = InterpreterOptions {
                runtime_parameters: runtime_parameters(env)?,
                debug: debug_config(&config, debug, debug_granularity, debug_targets),
            };
            Ok(interpret_model(&model, &extensions, &options, TracingLogger).await)
        }

        Commands::Check { model, env } => {
            let model = read_model(&model).await?;
            let params = runtime_parameters(env)?;
            let (_, diagnostics) = crate::validation::check_model(&model, &extensions, &params);
            crate::pipeline::report_diagnostics(&diagnostics);

            if diagnostics.has_errors() {
                eprintln!("✗ Model has {} error(s)", diagnostics.errors().count());
                Ok(InterpreterExitCode::Failure)
            } else {
                println!("✓ Model is valid");
                Ok(InterpreterExitCode::Success)
            }
        }

        Commands::Types { model } => {
            let model = read_model(&model).await?;
            let (types, diagnostics) =
                crate::validation::check_model(&model, &extensions, &RuntimeParameterProvider::new());
            crate::pipeline::report_diagnostics(&diagnostics);

            let mut listed: Vec<&ValueType> = types.atomic_types().collect();
            listed.sort_by_key(|t| t.to_string());
            if listed.is_empty() {
                println!("No value types defined");
            }
            for valuetype in listed {
                let supertype = match valuetype {
                    ValueType::Atomic(atomic) => atomic
                        .supertype
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    _ => String::new(),
                };
                let column = sql_column_type(valuetype)
                    .with_context(|| format!("Value type '{}' has no SQL column type", valuetype))?;
                println!("  {} oftype {} | {}", valuetype, supertype, column);
            }
            Ok(InterpreterExitCode::Success)
        }
    }
}

async fn read_model(path: &Path) -> Result<Model> {
    load_model(path)
        .await
        .with_context(|| format!("Failed to load model {}", path.display()))
}

fn runtime_parameters(assignments: Vec<String>) -> Result<RuntimeParameterProvider> {
    Ok(RuntimeParameterProvider::from_assignments(assignments)?)
}

/// Command line flags win over configured debug settings
fn debug_config(
    config: &Config,
    debug: bool,
    granularity: Option<DebugGranularity>,
    targets: Vec<String>,
) -> DebugConfig {
    let mut resolved = config.to_debug_config();
    resolved.enabled |= debug;
    if let Some(granularity) = granularity {
        resolved.granularity = granularity;
    }
    if !targets.is_empty() {
        resolved.targets = DebugTargets::from_names(targets);
    }
    resolved
}
