//! Human-readable reconciliation report (stderr).

use std::fmt::Write;

use docmatch_io::ClientLoad;
use docmatch_io::IssueKind;
use docmatch_recon::model::ReconResult;

/// Entries shown per list before the "... and N more" tail.
pub const MAX_LISTED: usize = 20;
/// Filenames shown per orphan identifier.
pub const MAX_FILES: usize = 3;

pub fn render(result: &ReconResult, load: Option<&ClientLoad>) -> String {
    let mut out = String::new();
    let s = &result.summary;

    let _ = writeln!(out, "reconciliation: {}", result.meta.config_name);
    let _ = writeln!(
        out,
        "clients:   {} total, {} matched ({} exact, {} tolerant, {} filename, {} name), {} without documents",
        s.total_clients,
        s.matched,
        s.matched_exact,
        s.matched_tolerant,
        s.matched_filename,
        s.matched_name,
        s.clients_without_documents,
    );
    let _ = writeln!(
        out,
        "documents: {} total, {} matched, {} without client ({} identifier(s)), {} unextractable",
        s.total_documents,
        s.matched_documents,
        s.documents_without_client,
        s.identifiers_without_client,
        s.unextractable_documents,
    );
    if let Some(load) = load {
        let warnings = load.issues.iter().filter(|i| i.kind == IssueKind::Warning).count();
        let _ = writeln!(
            out,
            "rows:      {} rejected, {} warning(s), {} blank identifier(s) skipped",
            load.rejected(),
            warnings,
            load.skipped_blank,
        );
    }
    if result.meta.tolerant && s.matched_tolerant > 0 {
        let _ = writeln!(
            out,
            "note:      {} tolerant match(es); check the identifiers before sending",
            s.matched_tolerant
        );
    }

    if !result.clients_without_documents.is_empty() {
        let _ = writeln!(
            out,
            "\nclients without documents ({}):",
            result.clients_without_documents.len()
        );
        for client in result.clients_without_documents.iter().take(MAX_LISTED) {
            let _ = writeln!(
                out,
                "  row {:<5} {} | {} | {}",
                client.source_row,
                client.identifier,
                client.name,
                client.emails.join("; "),
            );
        }
        more(&mut out, "  ", result.clients_without_documents.len(), MAX_LISTED);
    }

    let orphans = result.orphans_by_identifier();
    if !orphans.is_empty() {
        let _ = writeln!(out, "\nidentifiers without client ({}):", orphans.len());
        for (identifier, docs) in orphans.iter().take(MAX_LISTED) {
            let _ = writeln!(out, "  {identifier} ({} document(s))", docs.len());
            for doc in docs.iter().take(MAX_FILES) {
                let _ = writeln!(out, "    - {}", doc.filename);
            }
            more(&mut out, "    ", docs.len(), MAX_FILES);
        }
        more(&mut out, "  ", orphans.len(), MAX_LISTED);
    }

    if !result.unextractable.is_empty() {
        let _ = writeln!(out, "\nno identifier in filename ({}):", result.unextractable.len());
        for doc in result.unextractable.iter().take(MAX_LISTED) {
            let _ = writeln!(out, "  {}", doc.source_path);
        }
        more(&mut out, "  ", result.unextractable.len(), MAX_LISTED);
    }

    out
}

fn more(out: &mut String, indent: &str, total: usize, shown: usize) {
    if total > shown {
        let _ = writeln!(out, "{indent}... and {} more", total - shown);
    }
}
