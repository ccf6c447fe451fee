use std::collections::HashSet;
use std::path::Path;

use crate::model::{ClientMatch, ClientRecord, ExtractedDocument, MatchMethod, OrphanDocument, ReconSummary};

/// Compute summary statistics from the partitioned results.
pub fn compute_summary(
    matched: &[ClientMatch],
    clients_without_documents: &[ClientRecord],
    documents_without_client: &[OrphanDocument],
    unextractable: &[ExtractedDocument],
    total_documents: usize,
) -> ReconSummary {
    let mut summary = ReconSummary {
        total_clients: matched.len() + clients_without_documents.len(),
        matched: matched.len(),
        clients_without_documents: clients_without_documents.len(),
        total_documents,
        documents_without_client: documents_without_client.len(),
        unextractable_documents: unextractable.len(),
        ..ReconSummary::default()
    };

    let mut attached: HashSet<&Path> = HashSet::new();
    for m in matched {
        match m.method {
            MatchMethod::Exact => summary.matched_exact += 1,
            MatchMethod::Tolerant => summary.matched_tolerant += 1,
            MatchMethod::FilenameContains => summary.matched_filename += 1,
            MatchMethod::Name => summary.matched_name += 1,
        }
        attached.extend(m.documents.iter().map(|d| d.local_path.as_path()));
    }
    summary.matched_documents = attached.len();

    let orphan_ids: HashSet<&str> = documents_without_client
        .iter()
        .map(|o| o.identifier.as_str())
        .collect();
    summary.identifiers_without_client = orphan_ids.len();

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(row: usize) -> ClientRecord {
        ClientRecord {
            identifier: format!("90000000{row}"),
            name: format!("Client {row}"),
            emails: vec![format!("c{row}@example.com")],
            source_row: row,
        }
    }

    fn doc(name: &str) -> ExtractedDocument {
        ExtractedDocument::new(name, format!("/work/{name}"))
    }

    fn matched(row: usize, method: MatchMethod, docs: &[&str]) -> ClientMatch {
        ClientMatch {
            client: client(row),
            identifier: format!("90000000{row}"),
            method,
            matched_key: None,
            documents: docs.iter().map(|d| doc(d)).collect(),
        }
    }

    #[test]
    fn summary_counts() {
        let m = vec![
            matched(2, MatchMethod::Exact, &["a.pdf", "b.pdf"]),
            matched(3, MatchMethod::Tolerant, &["c.pdf"]),
            matched(4, MatchMethod::Name, &["a.pdf"]),
        ];
        let without = vec![client(5)];
        let orphans = vec![
            OrphanDocument { identifier: "800000001".into(), document: doc("d.pdf") },
            OrphanDocument { identifier: "800000001".into(), document: doc("e.pdf") },
            OrphanDocument { identifier: "800000002".into(), document: doc("f.pdf") },
        ];
        let unextractable = vec![doc("g.pdf")];

        let s = compute_summary(&m, &without, &orphans, &unextractable, 7);
        assert_eq!(s.total_clients, 4);
        assert_eq!(s.matched, 3);
        assert_eq!(s.matched_exact, 1);
        assert_eq!(s.matched_tolerant, 1);
        assert_eq!(s.matched_name, 1);
        assert_eq!(s.matched_filename, 0);
        assert_eq!(s.clients_without_documents, 1);
        // a.pdf attached twice counts once
        assert_eq!(s.matched_documents, 3);
        assert_eq!(s.documents_without_client, 3);
        assert_eq!(s.identifiers_without_client, 2);
        assert_eq!(s.unextractable_documents, 1);
        assert_eq!(
            s.matched_documents + s.documents_without_client + s.unextractable_documents,
            s.total_documents
        );
    }
}
