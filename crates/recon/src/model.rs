use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One client row as delivered by the spreadsheet collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRecord {
    /// Raw identifier as read from the source (may carry `-DV`, dots, `.0`).
    pub identifier: String,
    pub name: String,
    /// At least one address, in source order.
    pub emails: Vec<String>,
    /// 1-based row in the source sheet.
    pub source_row: usize,
}

/// One document materialized on disk by the corpus collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedDocument {
    /// Entry path inside the archive (or relative path in a directory scan).
    pub source_path: String,
    /// Where the file lives for the duration of the run.
    pub local_path: PathBuf,
    /// Base name of `source_path`.
    pub filename: String,
    /// Canonical identifier, once the index has resolved one.
    pub resolved_identifier: Option<String>,
}

impl ExtractedDocument {
    pub fn new(source_path: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        let source_path = source_path.into();
        let filename = base_name(&source_path).to_string();
        Self {
            source_path,
            local_path: local_path.into(),
            filename,
            resolved_identifier: None,
        }
    }
}

/// Last path component, accepting both `/` and `\` separators (archive
/// entries written on Windows keep backslashes).
pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Pre-loaded inputs for one reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconInput {
    pub clients: Vec<ClientRecord>,
    pub corpus: Vec<ExtractedDocument>,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Which step of the cascade produced a match, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Tolerant,
    FilenameContains,
    Name,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Tolerant => write!(f, "tolerant"),
            Self::FilenameContains => write!(f, "filename_contains"),
            Self::Name => write!(f, "name"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientMatch {
    pub client: ClientRecord,
    /// The client's normalized identifier (may be empty for name matches).
    pub identifier: String,
    pub method: MatchMethod,
    /// Index key that satisfied the lookup; differs from `identifier` for
    /// tolerant matches, absent for filename/name fallbacks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_key: Option<String>,
    pub documents: Vec<ExtractedDocument>,
}

/// An indexed document no client claimed.
#[derive(Debug, Clone, Serialize)]
pub struct OrphanDocument {
    pub identifier: String,
    pub document: ExtractedDocument,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconSummary {
    pub total_clients: usize,
    pub matched: usize,
    pub matched_exact: usize,
    pub matched_tolerant: usize,
    pub matched_filename: usize,
    pub matched_name: usize,
    pub clients_without_documents: usize,
    pub total_documents: usize,
    pub matched_documents: usize,
    pub documents_without_client: usize,
    pub unextractable_documents: usize,
    pub identifiers_without_client: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
    pub tolerant: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    pub matched: Vec<ClientMatch>,
    pub clients_without_documents: Vec<ClientRecord>,
    pub documents_without_client: Vec<OrphanDocument>,
    pub unextractable: Vec<ExtractedDocument>,
}

impl ReconResult {
    /// Identifier → documents view. Clients resolved by name with no usable
    /// identifier are keyed by their name instead.
    pub fn matched_by_identifier(&self) -> BTreeMap<String, Vec<&ExtractedDocument>> {
        let mut out: BTreeMap<String, Vec<&ExtractedDocument>> = BTreeMap::new();
        for m in &self.matched {
            let key = if m.identifier.is_empty() {
                m.client.name.clone()
            } else {
                m.identifier.clone()
            };
            let docs = out.entry(key).or_default();
            for doc in &m.documents {
                if !docs.iter().any(|d| d.local_path == doc.local_path) {
                    docs.push(doc);
                }
            }
        }
        out
    }

    /// Attachment candidates for one client, by source row.
    pub fn attachments_for(&self, source_row: usize) -> Option<Vec<&Path>> {
        self.matched
            .iter()
            .find(|m| m.client.source_row == source_row)
            .map(|m| m.documents.iter().map(|d| d.local_path.as_path()).collect())
    }

    /// Orphans grouped by identifier, ascending.
    pub fn orphans_by_identifier(&self) -> BTreeMap<&str, Vec<&ExtractedDocument>> {
        let mut out: BTreeMap<&str, Vec<&ExtractedDocument>> = BTreeMap::new();
        for orphan in &self.documents_without_client {
            out.entry(orphan.identifier.as_str()).or_default().push(&orphan.document);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_from_nested_entry() {
        let doc = ExtractedDocument::new("2024/enero/NIT 900219353.pdf", "/tmp/x/NIT 900219353.pdf");
        assert_eq!(doc.filename, "NIT 900219353.pdf");
        assert!(doc.resolved_identifier.is_none());
    }

    #[test]
    fn filename_from_backslash_entry() {
        let doc = ExtractedDocument::new(r"lote\F_1.pdf", "/tmp/F_1.pdf");
        assert_eq!(doc.filename, "F_1.pdf");
    }

    #[test]
    fn method_display_matches_serde() {
        for method in [
            MatchMethod::Exact,
            MatchMethod::Tolerant,
            MatchMethod::FilenameContains,
            MatchMethod::Name,
        ] {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{method}\""));
        }
    }
}
