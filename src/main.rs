use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use jobqueue::config::{JobQueueConfig, LoggingConfig};

#[derive(Parser)]
#[command(
    name = "jobqueue",
    about = "Command-driven CPU job queue with linked and indexed views",
    version,
    long_about = None
)]
struct Cli {
    /// TOML config file (overrides JOBQUEUE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command script and print the audit trail
    Run {
        /// Script file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Print a JSON snapshot of the final queue after the trail
        #[arg(long)]
        summary_json: bool,
    },

    /// Parse a command script without running it
    Check {
        /// Script file; reads stdin when omitted
        input: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, source) = JobQueueConfig::resolve(cli.config.as_deref())?;
    init_tracing(&config.logging);
    source.log();
    tracing::debug!(?config, "resolved configuration");

    match cli.command {
        Commands::Run {
            input,
            summary_json,
        } => {
            let script = read_input(input.as_deref())?;
            let stdout = io::stdout();
            let out = io::BufWriter::new(stdout.lock());
            let (summary, queue) = jobqueue::run_script(&script, &config.queue, out)?;

            if summary_json {
                let report = serde_json::json!({
                    "summary": summary,
                    "queue": queue.snapshot(),
                });
                let json_output = serde_json::to_string_pretty(&report)?;
                println!("{}", json_output);
            }
        }
        Commands::Check { input } => {
            let source = read_input(input.as_deref())?;
            let script = jobqueue::command::parse_script(&source)
                .context("failed to parse command script")?;
            println!(
                "Script OK: {} command(s), {} declared",
                script.commands.len(),
                script.declared
            );
            if script.is_truncated() {
                println!("Warning: script ends before the declared command count");
            }
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read script from stdin")?;
            Ok(buf)
        }
    }
}
