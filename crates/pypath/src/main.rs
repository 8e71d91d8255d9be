use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use pypath::app::command::{
    COPY_PYTHON_PATH, CommandContext, CommandError, CommandOutcome, CommandTable,
};
use pypath::app::resolver::PathResolver;
use pypath::app::status::{StatusLine, StatusMessage, StatusSink};
use pypath::infra::clipboard::{Clipboard, ClipboardLifetime, ClipboardSink, PrintSink};
use pypath::infra::config::Config;

const EXIT_NO_PATH: u8 = 1;
const EXIT_NOT_ENABLED: u8 = 1;
const EXIT_DISABLED: u8 = 2;

#[derive(Parser)]
#[command(
    name = "pypath",
    author,
    version,
    about = "Copy the dotted python import path of a file",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extra configuration file layered over global and workspace config
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the python path of FILE to the clipboard
    Copy {
        file: PathBuf,
        /// Print the path to stdout instead of touching the clipboard
        #[arg(long)]
        print_only: bool,
    },
    /// Print the python path of FILE
    Resolve {
        file: PathBuf,
        /// Emit a JSON report with segments and import root
        #[arg(long)]
        json: bool,
    },
    /// Exit successfully if FILE has a recognized extension
    Check { file: PathBuf },
    /// Print the effective configuration
    Config,
    /// List the registered commands
    Commands,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    pypath::init(cli.verbose);
    let explicit = cli.config.as_deref();

    match cli.command {
        Commands::Copy { file, print_only } => {
            let active_file = absolute(&file)?;
            let config = Config::load(explicit, active_file.parent())?;
            run_copy(&config, &active_file, print_only)
        }
        Commands::Resolve { file, json } => {
            let active_file = absolute(&file)?;
            let config = Config::load(explicit, active_file.parent())?;
            run_resolve(&PathResolver::from_config(&config), &active_file, json)
        }
        Commands::Check { file } => {
            let active_file = absolute(&file)?;
            let config = Config::load(explicit, active_file.parent())?;
            if PathResolver::from_config(&config).is_enabled(&active_file) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(EXIT_NOT_ENABLED))
            }
        }
        Commands::Config => {
            let config = Config::load(explicit, None)?;
            print!("{}", config.to_toml()?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Commands => {
            let config = Config::load(explicit, None)?;
            let table = CommandTable::with_defaults(PathResolver::from_config(&config));
            let mut stdout = io::stdout().lock();
            for command in table.commands() {
                writeln!(stdout, "{:<18} {}", command.name, command.description)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "pypath", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_copy(config: &Config, active_file: &Path, print_only: bool) -> Result<ExitCode> {
    let table = CommandTable::with_defaults(PathResolver::from_config(config));
    let mut status = StatusLine::new(io::stderr()).with_enabled(config.status.show());

    let outcome = if print_only {
        let mut sink = PrintSink::new(io::stdout());
        invoke_copy(&table, active_file, &mut sink, &mut status)
    } else {
        let mut clipboard = Clipboard::new(ClipboardLifetime::OneShot)
            .with_fallbacks(config.clipboard.fallback_commands());
        invoke_copy(&table, active_file, &mut clipboard, &mut status)
    };

    match outcome {
        Ok(CommandOutcome::Copied(python_path)) => {
            tracing::debug!(%python_path, "copy finished");
            Ok(ExitCode::SUCCESS)
        }
        Ok(CommandOutcome::Skipped) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<CommandError>() {
            Some(disabled @ CommandError::Disabled { .. }) => {
                status.show(StatusMessage::error(disabled.to_string()));
                Ok(ExitCode::from(EXIT_DISABLED))
            }
            _ => Err(err),
        },
    }
}

fn invoke_copy(
    table: &CommandTable,
    active_file: &Path,
    clipboard: &mut dyn ClipboardSink,
    status: &mut dyn StatusSink,
) -> Result<CommandOutcome> {
    let mut ctx = CommandContext::new(Some(active_file), clipboard, status);
    table.invoke(COPY_PYTHON_PATH.name, &mut ctx)
}

fn run_resolve(resolver: &PathResolver, active_file: &Path, json: bool) -> Result<ExitCode> {
    if !resolver.is_enabled(active_file) {
        eprintln!(
            "error: {} does not have a recognized extension ({})",
            active_file.display(),
            resolver.extensions().join(", ")
        );
        return Ok(ExitCode::from(EXIT_DISABLED));
    }

    let Some(python_path) = resolver.resolve(active_file) else {
        return Ok(ExitCode::from(EXIT_NO_PATH));
    };

    if json {
        let report =
            serde_json::to_string_pretty(&python_path).context("failed to serialize report")?;
        println!("{report}");
    } else {
        println!("{python_path}");
    }
    Ok(ExitCode::SUCCESS)
}

fn absolute(file: &Path) -> Result<PathBuf> {
    std::path::absolute(file).with_context(|| format!("invalid file path: {}", file.display()))
}
