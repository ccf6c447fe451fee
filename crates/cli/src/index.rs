//! `docmatch index`: what the index would look like for a corpus.

use std::collections::BTreeMap;
use std::path::PathBuf;

use docmatch_io::ArchiveOptions;
use docmatch_recon::{LogObserver, Reconciler};
use serde::Serialize;

use crate::corpus::{self, CorpusArgs};
use crate::{load_config, CliError};

#[derive(Serialize)]
struct IndexReport<'a> {
    summary: docmatch_recon::index::IndexSummary,
    identifiers: BTreeMap<&'a str, Vec<&'a str>>,
    unextractable: Vec<&'a str>,
}

pub fn cmd_index(source: CorpusArgs, json: bool, config: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    let corpus = corpus::materialize(&source, &ArchiveOptions::from_config(&config.extraction))?;

    let index = Reconciler::new(&config, &LogObserver).index(&corpus.documents);
    let summary = index.summary();

    if json {
        let report = IndexReport {
            summary,
            identifiers: index
                .entries()
                .map(|(key, docs)| (key, docs.iter().map(|d| d.source_path.as_str()).collect()))
                .collect(),
            unextractable: index.unextractable().iter().map(|d| d.source_path.as_str()).collect(),
        };
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{out}");
        return Ok(());
    }

    println!(
        "documents:   {} total, {} indexed, {} without identifier",
        summary.total_documents, summary.indexed_documents, summary.unextractable_documents
    );
    println!(
        "identifiers: {} ({:.2} document(s) each)",
        summary.total_identifiers, summary.avg_documents_per_identifier
    );
    if let Some(busiest) = &summary.busiest_identifier {
        println!("busiest:     {busiest} ({} document(s))", summary.busiest_count);
    }
    if !index.unextractable().is_empty() {
        println!("\nno identifier in filename:");
        for doc in index.unextractable() {
            println!("  {}", doc.source_path);
        }
    }
    Ok(())
}
