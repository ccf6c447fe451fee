use std::collections::HashSet;
use std::path::Path;

use crate::config::{MatchingConfig, ReconConfig};
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::extract::IdentifierExtractor;
use crate::identifier::{normalize, MIN_DIGITS};
use crate::index::DocumentIndex;
use crate::matcher::NameMatcher;
use crate::model::{
    ClientMatch, ClientRecord, ExtractedDocument, MatchMethod, OrphanDocument, ReconInput, ReconMeta,
    ReconResult,
};
use crate::observer::{LogObserver, ReconObserver};

/// Run reconciliation per config, reporting through the `log` facade.
pub fn run(config: &ReconConfig, input: &ReconInput) -> Result<ReconResult, ReconError> {
    Reconciler::new(config, &LogObserver).reconcile(&input.clients, &input.corpus)
}

/// Resolves clients against a document corpus:
/// exact key → mirror key (opt-in) → filename scan → client name.
pub struct Reconciler<'o> {
    config_name: String,
    matching: MatchingConfig,
    extractor: IdentifierExtractor,
    names: NameMatcher,
    observer: &'o dyn ReconObserver,
}

struct Resolution {
    method: MatchMethod,
    matched_key: Option<String>,
    documents: Vec<ExtractedDocument>,
}

impl<'o> Reconciler<'o> {
    pub fn new(config: &ReconConfig, observer: &'o dyn ReconObserver) -> Self {
        Self {
            config_name: config.name.clone(),
            matching: config.matching.clone(),
            extractor: IdentifierExtractor::from_config(&config.extraction),
            names: NameMatcher::from_config(&config.names),
            observer,
        }
    }

    pub fn extractor(&self) -> &IdentifierExtractor {
        &self.extractor
    }

    /// Build the index for `corpus` with this reconciler's extractor.
    pub fn index(&self, corpus: &[ExtractedDocument]) -> DocumentIndex {
        DocumentIndex::build(corpus, &self.extractor, self.observer)
    }

    /// Partition `clients` into matched / without documents, and the corpus
    /// into matched / without client / unextractable.
    ///
    /// Fails only when an input violates its contract; per-record problems
    /// (unparseable identifiers, names that match nothing) end up in the report.
    pub fn reconcile(
        &self,
        clients: &[ClientRecord],
        corpus: &[ExtractedDocument],
    ) -> Result<ReconResult, ReconError> {
        validate_clients(clients)?;
        validate_corpus(corpus)?;

        // The whole corpus is indexed before any lookup runs.
        let index = self.index(corpus);

        let mut matched: Vec<ClientMatch> = Vec::new();
        let mut clients_without_documents: Vec<ClientRecord> = Vec::new();
        for client in clients {
            let identifier = normalize(&client.identifier);

            match self.resolve(client, &identifier, &index) {
                Some(resolution) => {
                    if resolution.method != MatchMethod::Exact {
                        self.observer.fallback_match(
                            client,
                            resolution.method,
                            resolution.matched_key.as_deref(),
                            resolution.documents.len(),
                        );
                    }
                    matched.push(ClientMatch {
                        client: client.clone(),
                        identifier,
                        method: resolution.method,
                        matched_key: resolution.matched_key,
                        documents: resolution.documents,
                    });
                }
                None => {
                    self.observer.client_without_documents(client, &identifier);
                    clients_without_documents.push(client.clone());
                }
            }
        }

        let attached: HashSet<&Path> = matched
            .iter()
            .flat_map(|m| m.documents.iter().map(|d| d.local_path.as_path()))
            .collect();

        let mut documents_without_client: Vec<OrphanDocument> = Vec::new();
        for (key, docs) in index.entries() {
            for doc in docs {
                if !attached.contains(doc.local_path.as_path()) {
                    documents_without_client.push(OrphanDocument {
                        identifier: key.to_string(),
                        document: doc.clone(),
                    });
                }
            }
        }
        documents_without_client.sort_by(|a, b| {
            a.identifier
                .cmp(&b.identifier)
                .then_with(|| a.document.filename.cmp(&b.document.filename))
        });
        for orphan in &documents_without_client {
            self.observer.document_without_client(&orphan.identifier, &orphan.document);
        }

        let unextractable: Vec<ExtractedDocument> = index
            .unextractable()
            .iter()
            .filter(|d| !attached.contains(d.local_path.as_path()))
            .cloned()
            .collect();

        let summary = compute_summary(
            &matched,
            &clients_without_documents,
            &documents_without_client,
            &unextractable,
            index.documents().len(),
        );
        self.observer.finished(&summary);

        Ok(ReconResult {
            meta: ReconMeta {
                config_name: self.config_name.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
                tolerant: self.matching.tolerant,
            },
            summary,
            matched,
            clients_without_documents,
            documents_without_client,
            unextractable,
        })
    }

    fn resolve(
        &self,
        client: &ClientRecord,
        identifier: &str,
        index: &DocumentIndex,
    ) -> Option<Resolution> {
        if let Some(hit) = index.find(identifier, self.matching.tolerant) {
            return Some(Resolution {
                method: if hit.mirrored { MatchMethod::Tolerant } else { MatchMethod::Exact },
                matched_key: Some(hit.key.to_string()),
                documents: hit.documents.to_vec(),
            });
        }

        // Short digit strings would appear inside unrelated filenames.
        if self.matching.filename_contains && identifier.len() >= MIN_DIGITS {
            let documents: Vec<ExtractedDocument> = index
                .documents()
                .iter()
                .filter(|d| d.filename.contains(identifier))
                .cloned()
                .collect();
            if !documents.is_empty() {
                return Some(Resolution {
                    method: MatchMethod::FilenameContains,
                    matched_key: None,
                    documents,
                });
            }
        }

        if self.matching.name_fallback {
            let documents: Vec<ExtractedDocument> = self
                .names
                .rank(&client.name, index.documents())
                .into_iter()
                .map(|hit| hit.document.clone())
                .collect();
            if !documents.is_empty() {
                return Some(Resolution {
                    method: MatchMethod::Name,
                    matched_key: None,
                    documents,
                });
            }
        }

        None
    }
}

fn validate_clients(clients: &[ClientRecord]) -> Result<(), ReconError> {
    for client in clients {
        if client.emails.iter().all(|e| e.trim().is_empty()) {
            return Err(ReconError::MalformedClient {
                row: client.source_row,
                reason: "no email address".into(),
            });
        }
    }
    Ok(())
}

fn validate_corpus(corpus: &[ExtractedDocument]) -> Result<(), ReconError> {
    for doc in corpus {
        if doc.local_path.as_os_str().is_empty() {
            return Err(ReconError::MalformedDocument {
                source_path: doc.source_path.clone(),
                reason: "empty local path".into(),
            });
        }
        if doc.filename.trim().is_empty() {
            return Err(ReconError::MalformedDocument {
                source_path: doc.source_path.clone(),
                reason: "empty filename".into(),
            });
        }
    }
    Ok(())
}
