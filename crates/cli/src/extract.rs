//! `docmatch extract`: run the filename extractor on the command line.

use std::path::PathBuf;

use docmatch_recon::identifier::normalize;
use docmatch_recon::IdentifierExtractor;

use crate::{load_config, CliError};

pub fn cmd_extract(
    filenames: Vec<String>,
    explain: bool,
    json: bool,
    config: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    let extractor = IdentifierExtractor::from_config(&config.extraction);

    let traces: Vec<_> = filenames.iter().map(|f| extractor.explain(f)).collect();

    if json {
        let out = serde_json::to_string_pretty(&traces)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    for trace in &traces {
        let id = trace.winner.as_deref().map(normalize);
        println!("{} → {}", trace.filename, id.as_deref().unwrap_or("-"));

        if explain {
            match trace.marker_position {
                Some(pos) => println!("  NIT marker at byte {pos} of '{}'", trace.stem),
                None => println!("  no NIT marker in '{}'", trace.stem),
            }
            for c in &trace.candidates {
                let status = if trace.discarded.contains(c) {
                    "discarded (invoice number)"
                } else if trace.winner.as_deref() == Some(c.digits.as_str()) {
                    "winner"
                } else {
                    "candidate"
                };
                println!("  {:<10} @{:<3} {:<13} {status}", c.digits, c.position, c.strategy.to_string());
            }
        }
    }
    Ok(())
}
