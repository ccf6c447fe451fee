// docmatch CLI - pair client spreadsheets with archived documents by NIT

mod corpus;
mod exit_codes;
mod extract;
mod index;
mod recon;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use docmatch_recon::{ReconConfig, ReconError};
use log::LevelFilter;

use exit_codes::{EXIT_ERROR, EXIT_INPUT, EXIT_INVALID_CONFIG, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "docmatch")]
#[command(about = "Match client records to archived documents by tax identifier (NIT)")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a client spreadsheet against a document archive
    Recon {
        #[command(subcommand)]
        command: recon::ReconCommands,
    },

    /// Show which identifier each filename resolves to
    #[command(after_help = "\
Examples:
  docmatch extract 'NIT._ 900219353 MAKRO SAS.pdf'
  docmatch extract --explain 'RF-84838082-900219353-V-F-F.pdf'
  ls facturas/ | xargs -d '\\n' docmatch extract --json")]
    Extract {
        /// Filenames (or paths; only the last component is used)
        #[arg(required = true)]
        filenames: Vec<String>,

        /// List every candidate and why it won or lost
        #[arg(long)]
        explain: bool,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Reconciliation config (extraction strategies)
        #[arg(long, env = "DOCMATCH_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Build the identifier index for a corpus and summarize it
    #[command(after_help = "\
Examples:
  docmatch index --archive facturas.zip
  docmatch index --dir ./facturas --json")]
    Index {
        #[command(flatten)]
        source: corpus::CorpusArgs,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Reconciliation config (extraction strategies, extensions)
        #[arg(long, env = "DOCMATCH_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, msg)
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self::new(EXIT_ERROR, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => {
                Self::new(EXIT_INVALID_CONFIG, err.to_string())
            }
            ReconError::MalformedClient { .. } | ReconError::MalformedDocument { .. } => {
                Self::input(err.to_string())
            }
        }
    }
}

impl From<docmatch_io::IoError> for CliError {
    fn from(err: docmatch_io::IoError) -> Self {
        use docmatch_io::IoError;
        let hint = match &err {
            IoError::MissingColumns(_) => {
                Some("rename the header or add an alias under [columns] in the config".to_string())
            }
            IoError::NoDocuments => Some("check [extraction].extensions in the config".to_string()),
            IoError::UnsupportedFormat(_) => {
                Some("supported: xlsx, xls, xlsm, xlsb, ods, csv, tsv, txt".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_INPUT, message: err.to_string(), hint }
    }
}

/// Config from `path`, or the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let Some(path) = path else {
        return Ok(ReconConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("cannot read config {}: {e}", path.display())))?;
    Ok(ReconConfig::from_toml(&text)?)
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("DOCMATCH_GIT_REV"), ")",
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    // RUST_LOG, when set, wins over the flags.
    builder.parse_env("RUST_LOG");
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Recon { command } => recon::cmd_recon(command),
        Commands::Extract { filenames, explain, json, config } => {
            extract::cmd_extract(filenames, explain, json, config)
        }
        Commands::Index { source, json, config } => index::cmd_index(source, json, config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
