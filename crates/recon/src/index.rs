use std::collections::{BTreeMap, HashSet};
use std::ops::Bound;
use std::path::Path;

use serde::Serialize;

use crate::extract::IdentifierExtractor;
use crate::identifier::{mirrors, normalize};
use crate::model::ExtractedDocument;
use crate::observer::ReconObserver;

/// Documents keyed by canonical identifier. Built once per corpus and
/// read-only afterwards; tolerant lookups only ever see a complete index.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    entries: BTreeMap<String, Vec<ExtractedDocument>>,
    unextractable: Vec<ExtractedDocument>,
    /// Every distinct document in corpus order, with its resolved key.
    documents: Vec<ExtractedDocument>,
}

/// Result of a successful lookup.
#[derive(Debug, Clone, Copy)]
pub struct IndexHit<'a> {
    pub key: &'a str,
    pub documents: &'a [ExtractedDocument],
    /// True when the key is a mirror of the query, not the query itself.
    pub mirrored: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSummary {
    pub total_documents: usize,
    pub indexed_documents: usize,
    pub unextractable_documents: usize,
    pub total_identifiers: usize,
    pub avg_documents_per_identifier: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busiest_identifier: Option<String>,
    pub busiest_count: usize,
}

impl DocumentIndex {
    /// Extract + normalize every document's filename. Documents without a
    /// key go to the unextractable list. A `local_path` seen twice is the
    /// same document and is kept once.
    pub fn build(
        corpus: &[ExtractedDocument],
        extractor: &IdentifierExtractor,
        observer: &dyn ReconObserver,
    ) -> Self {
        let mut index = Self::default();
        let mut seen: HashSet<&Path> = HashSet::new();

        for doc in corpus {
            if !seen.insert(doc.local_path.as_path()) {
                continue;
            }

            let key = extractor
                .extract(&doc.filename)
                .map(|raw| normalize(&raw))
                .filter(|k| !k.is_empty());

            let mut doc = doc.clone();
            doc.resolved_identifier = key.clone();

            match key {
                Some(key) => {
                    observer.document_indexed(&doc, &key);
                    index.entries.entry(key).or_default().push(doc.clone());
                }
                None => {
                    observer.document_unextractable(&doc);
                    index.unextractable.push(doc.clone());
                }
            }
            index.documents.push(doc);
        }

        index
    }

    /// Exact key match only.
    pub fn get(&self, identifier: &str) -> Option<IndexHit<'_>> {
        self.entries.get_key_value(identifier).map(|(key, docs)| IndexHit {
            key,
            documents: docs,
            mirrored: false,
        })
    }

    /// Exact match, then (when `tolerant`) the first mirror key: the query
    /// minus its last digit, then keys one digit longer that extend it.
    pub fn find(&self, identifier: &str, tolerant: bool) -> Option<IndexHit<'_>> {
        if identifier.is_empty() {
            return None;
        }
        if let Some(hit) = self.get(identifier) {
            return Some(hit);
        }
        if !tolerant {
            return None;
        }

        let shorter = identifier
            .get(..identifier.len() - 1)
            .filter(|s| mirrors(identifier, s))
            .and_then(|s| self.entries.get_key_value(s));
        let found = shorter.or_else(|| {
            self.entries
                .range::<str, _>((Bound::Included(identifier), Bound::Unbounded))
                .take_while(|(k, _)| k.starts_with(identifier))
                .find(|(k, _)| mirrors(identifier, k))
        });

        found.map(|(key, docs)| IndexHit {
            key,
            documents: docs,
            mirrored: true,
        })
    }

    /// Documents for `identifier`; empty on a miss. Never contains duplicates.
    pub fn lookup(&self, identifier: &str, tolerant: bool) -> &[ExtractedDocument] {
        match self.find(identifier, tolerant) {
            Some(hit) => hit.documents,
            None => &[],
        }
    }

    /// Keys in ascending order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(key, documents)` pairs in ascending key order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &[ExtractedDocument])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn unextractable(&self) -> &[ExtractedDocument] {
        &self.unextractable
    }

    /// All distinct documents in corpus order, indexed or not.
    pub fn documents(&self) -> &[ExtractedDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> IndexSummary {
        let indexed_documents: usize = self.entries.values().map(Vec::len).sum();
        let busiest = self
            .entries
            .iter()
            .fold(None::<(&String, usize)>, |best, (k, v)| match best {
                Some((_, n)) if n >= v.len() => best,
                _ => Some((k, v.len())),
            });

        IndexSummary {
            total_documents: indexed_documents + self.unextractable.len(),
            indexed_documents,
            unextractable_documents: self.unextractable.len(),
            total_identifiers: self.entries.len(),
            avg_documents_per_identifier: if self.entries.is_empty() {
                0.0
            } else {
                indexed_documents as f64 / self.entries.len() as f64
            },
            busiest_identifier: busiest.map(|(k, _)| k.clone()),
            busiest_count: busiest.map_or(0, |(_, n)| n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NullObserver;

    fn doc(name: &str) -> ExtractedDocument {
        ExtractedDocument::new(name, format!("/work/{name}"))
    }

    fn build(names: &[&str]) -> DocumentIndex {
        let corpus: Vec<_> = names.iter().map(|n| doc(n)).collect();
        DocumentIndex::build(&corpus, &IdentifierExtractor::default(), &NullObserver)
    }

    #[test]
    fn groups_documents_by_key() {
        let index = build(&[
            "NIT 900219353 enero.pdf",
            "NIT 900219353 febrero.pdf",
            "NIT 830012345.pdf",
            "F_ORF_84838066.pdf",
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.lookup("900219353", false).len(), 2);
        assert_eq!(index.unextractable().len(), 1);
        assert_eq!(index.unextractable()[0].filename, "F_ORF_84838066.pdf");
        let ids: Vec<_> = index.identifiers().collect();
        assert_eq!(ids, vec!["830012345", "900219353"]);
    }

    #[test]
    fn resolved_identifier_is_recorded() {
        let index = build(&["NIT 900219353.pdf", "sin numero.pdf"]);
        assert_eq!(
            index.lookup("900219353", false)[0].resolved_identifier.as_deref(),
            Some("900219353")
        );
        assert!(index.unextractable()[0].resolved_identifier.is_none());
    }

    #[test]
    fn duplicate_local_path_stored_once() {
        let d = doc("NIT 900219353.pdf");
        let corpus = vec![d.clone(), d];
        let index = DocumentIndex::build(&corpus, &IdentifierExtractor::default(), &NullObserver);
        assert_eq!(index.lookup("900219353", false).len(), 1);
        assert_eq!(index.documents().len(), 1);
    }

    #[test]
    fn documents_keep_corpus_order() {
        let index = build(&["otro.pdf", "NIT 900219353.pdf", "NIT 830012345.pdf"]);
        let names: Vec<_> = index.documents().iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, vec!["otro.pdf", "NIT 900219353.pdf", "NIT 830012345.pdf"]);
    }

    #[test]
    fn exact_only_by_default() {
        let index = build(&["NIT 900219353.pdf"]);
        assert!(index.lookup("9002193531", false).is_empty());
        assert!(index.find("", true).is_none());
    }

    #[test]
    fn tolerant_ten_to_nine() {
        let index = build(&["NIT 900219353.pdf"]);
        let hit = index.find("9002193531", true).unwrap();
        assert_eq!(hit.key, "900219353");
        assert!(hit.mirrored);
    }

    #[test]
    fn tolerant_nine_to_ten() {
        let index = build(&["NIT 9002193531.pdf"]);
        let hit = index.find("900219353", true).unwrap();
        assert_eq!(hit.key, "9002193531");
        assert!(hit.mirrored);
    }

    #[test]
    fn tolerant_nine_to_eight_and_back() {
        let index = build(&["NIT 80012345.pdf", "NIT 700123456.pdf"]);
        assert_eq!(index.find("800123457", true).unwrap().key, "80012345");
        assert_eq!(index.find("70012345", true).unwrap().key, "700123456");
    }

    #[test]
    fn tolerant_prefers_shorter_mirror_first() {
        let index = build(&["NIT 90021935.pdf", "NIT 9002193531.pdf"]);
        assert_eq!(index.find("900219353", true).unwrap().key, "90021935");
    }

    #[test]
    fn no_mirror_across_eight_and_seven() {
        let index = build(&["NIT 1234567.pdf"]);
        assert!(index.find("12345678", true).is_none());
    }

    #[test]
    fn summary_counts() {
        let index = build(&[
            "NIT 900219353 a.pdf",
            "NIT 900219353 b.pdf",
            "NIT 830012345.pdf",
            "otro.pdf",
        ]);
        let s = index.summary();
        assert_eq!(s.total_documents, 4);
        assert_eq!(s.indexed_documents, 3);
        assert_eq!(s.unextractable_documents, 1);
        assert_eq!(s.total_identifiers, 2);
        assert!((s.avg_documents_per_identifier - 1.5).abs() < f64::EPSILON);
        assert_eq!(s.busiest_identifier.as_deref(), Some("900219353"));
        assert_eq!(s.busiest_count, 2);
    }

    #[test]
    fn empty_corpus() {
        let index = build(&[]);
        assert!(index.is_empty());
        let s = index.summary();
        assert_eq!(s.total_documents, 0);
        assert_eq!(s.avg_documents_per_identifier, 0.0);
        assert!(s.busiest_identifier.is_none());
    }
}
