//! `docmatch recon`: pair clients with their documents.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Subcommand;
use docmatch_io::{load_clients, ArchiveOptions, LoadOptions};
use docmatch_recon::{LogObserver, Reconciler};

use crate::corpus::{self, CorpusArgs};
use crate::exit_codes::EXIT_CLIENTS_WITHOUT_DOCUMENTS;
use crate::{load_config, report, CliError};

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Reconcile a client spreadsheet against a document archive or directory
    #[command(after_help = "\
Examples:
  docmatch recon run --clients clientes.xlsx --archive facturas.zip
  docmatch recon run --clients clientes.csv --dir ./facturas --tolerant
  docmatch recon run --clients clientes.xlsx --archive facturas.zip \\
      --config cartera.recon.toml --output result.json --issues-out filas.txt

Exit codes:
  0  every client has at least one document
  3  finished; some clients have no documents (see report)
  4  invalid config
  5  unreadable client file or archive")]
    Run {
        /// Client spreadsheet (xlsx, xls, xlsm, xlsb, ods, csv, tsv, txt)
        #[arg(long)]
        clients: PathBuf,

        #[command(flatten)]
        corpus: CorpusArgs,

        /// Reconciliation config (.recon.toml); defaults apply when absent
        #[arg(long, env = "DOCMATCH_CONFIG")]
        config: Option<PathBuf>,

        /// Accept mirror keys (one trailing digit more or less)
        #[arg(long)]
        tolerant: bool,

        /// Report client rows whose check digit does not match the NIT
        #[arg(long)]
        verify_check_digit: bool,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write rejected/suspicious client rows to a text file
        #[arg(long)]
        issues_out: Option<PathBuf>,
    },

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  docmatch recon validate cartera.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run {
            clients,
            corpus,
            config,
            tolerant,
            verify_check_digit,
            json,
            output,
            issues_out,
        } => cmd_recon_run(RunArgs {
            clients,
            corpus,
            config,
            tolerant,
            verify_check_digit,
            json,
            output,
            issues_out,
        }),
        ReconCommands::Validate { config } => cmd_recon_validate(config),
    }
}

struct RunArgs {
    clients: PathBuf,
    corpus: CorpusArgs,
    config: Option<PathBuf>,
    tolerant: bool,
    verify_check_digit: bool,
    json: bool,
    output: Option<PathBuf>,
    issues_out: Option<PathBuf>,
}

fn cmd_recon_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if args.tolerant {
        config.matching.tolerant = true;
    }

    if !args.clients.is_file() {
        return Err(CliError::usage(format!(
            "client file not found: {}",
            args.clients.display()
        )));
    }
    let load = load_clients(
        &args.clients,
        &config.columns,
        &LoadOptions { verify_check_digit: args.verify_check_digit },
    )?;
    if load.clients.is_empty() {
        return Err(CliError::input(format!(
            "no usable client rows in {}",
            args.clients.display()
        ))
        .with_hint("use --issues-out to see why rows were rejected"));
    }

    if let Some(path) = &args.issues_out {
        let mut text = String::new();
        for issue in &load.issues {
            let _ = writeln!(text, "{issue}");
        }
        std::fs::write(path, text)
            .map_err(|e| CliError::general(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {} ({} row issue(s))", path.display(), load.issues.len());
    }

    // Kept alive until the report is out; temporary extractions vanish with it.
    let corpus = corpus::materialize(&args.corpus, &ArchiveOptions::from_config(&config.extraction))?;

    let reconciler = Reconciler::new(&config, &LogObserver);
    let result = reconciler.reconcile(&load.clients, &corpus.documents)?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;

    if let Some(path) = &args.output {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::general(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if args.json {
        println!("{json_str}");
    }

    eprint!("{}", report::render(&result, Some(&load)));

    let missing = result.summary.clients_without_documents;
    if missing > 0 {
        return Err(CliError::new(
            EXIT_CLIENTS_WITHOUT_DOCUMENTS,
            format!("{missing} client(s) without documents"),
        ));
    }
    Ok(())
}

fn cmd_recon_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(Some(&config_path))?;

    eprintln!("valid: {}", config.name);
    eprintln!(
        "  matching:   tolerant={} filename_contains={} name_fallback={}",
        config.matching.tolerant, config.matching.filename_contains, config.matching.name_fallback,
    );
    let strategies: Vec<String> = config.extraction.strategies.iter().map(|s| s.to_string()).collect();
    eprintln!("  strategies: {}", strategies.join(", "));
    eprintln!("  extensions: {}", config.extraction.extensions.join(", "));
    eprintln!(
        "  names:      min_token_len={} extra_stopwords={}",
        config.names.min_token_len,
        config.names.extra_stopwords.len(),
    );
    Ok(())
}
