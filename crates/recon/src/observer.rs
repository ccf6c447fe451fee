//! Diagnostic hooks. The engine reports what it does through a
//! [`ReconObserver`] handed in by the caller instead of a global logger.

use crate::model::{ClientRecord, ExtractedDocument, MatchMethod, ReconSummary};

/// Every method defaults to a no-op; implement only what you need.
pub trait ReconObserver {
    fn document_indexed(&self, _doc: &ExtractedDocument, _identifier: &str) {}

    fn document_unextractable(&self, _doc: &ExtractedDocument) {}

    /// A non-exact step resolved the client (mirror key, filename scan, name).
    fn fallback_match(
        &self,
        _client: &ClientRecord,
        _method: MatchMethod,
        _matched_key: Option<&str>,
        _documents: usize,
    ) {
    }

    fn client_without_documents(&self, _client: &ClientRecord, _identifier: &str) {}

    fn document_without_client(&self, _identifier: &str, _doc: &ExtractedDocument) {}

    fn finished(&self, _summary: &ReconSummary) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ReconObserver for NullObserver {}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ReconObserver for LogObserver {
    fn document_indexed(&self, doc: &ExtractedDocument, identifier: &str) {
        log::debug!("indexed {} -> {identifier}", doc.filename);
    }

    fn document_unextractable(&self, doc: &ExtractedDocument) {
        log::warn!("no identifier in filename: {}", doc.source_path);
    }

    fn fallback_match(
        &self,
        client: &ClientRecord,
        method: MatchMethod,
        matched_key: Option<&str>,
        documents: usize,
    ) {
        match method {
            MatchMethod::Tolerant => log::warn!(
                "row {}: {} matched mirror key {} ({documents} document(s)); verify before sending",
                client.source_row,
                client.identifier,
                matched_key.unwrap_or("-"),
            ),
            _ => log::info!(
                "row {}: {} ({}) matched by {method} ({documents} document(s))",
                client.source_row,
                client.identifier,
                client.name,
            ),
        }
    }

    fn client_without_documents(&self, client: &ClientRecord, identifier: &str) {
        log::warn!(
            "row {}: no documents for {} | {} | {}",
            client.source_row,
            if identifier.is_empty() { client.identifier.as_str() } else { identifier },
            client.name,
            client.emails.join("; "),
        );
    }

    fn document_without_client(&self, identifier: &str, doc: &ExtractedDocument) {
        log::warn!("no client for {identifier}: {}", doc.filename);
    }

    fn finished(&self, summary: &ReconSummary) {
        log::info!(
            "reconciled {} client(s): {} matched ({} exact, {} tolerant, {} filename, {} name), {} without documents; {} document(s) without client, {} unextractable",
            summary.total_clients,
            summary.matched,
            summary.matched_exact,
            summary.matched_tolerant,
            summary.matched_filename,
            summary.matched_name,
            summary.clients_without_documents,
            summary.documents_without_client,
            summary.unextractable_documents,
        );
    }
}
