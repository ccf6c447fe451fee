//! Name-based fallback for clients whose identifier found nothing.

use std::collections::BTreeSet;

use crate::config::NameConfig;
use crate::extract::filename_stem;
use crate::model::ExtractedDocument;

/// Legal-entity suffixes, generic business words and connectors that say
/// nothing about which company a file belongs to.
pub const STOPWORDS: [&str; 29] = [
    "sas", "sa", "ltda", "limitada", "sociedad", "por", "acciones", "simplificada",
    "comercializadora", "distribuidora", "inversiones", "productos", "servicios", "empresa",
    "compania", "cia", "de", "del", "la", "el", "y", "e", "los", "las", "en", "con", "s", "a",
    "sucursal",
];

const FALLBACK_TOKENS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameHit<'a> {
    pub document: &'a ExtractedDocument,
    pub score: usize,
}

#[derive(Debug, Clone)]
pub struct NameMatcher {
    stopwords: BTreeSet<String>,
    min_token_len: usize,
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::from_config(&NameConfig::default())
    }
}

impl NameMatcher {
    pub fn from_config(config: &NameConfig) -> Self {
        let mut stopwords: BTreeSet<String> = STOPWORDS.iter().map(|s| s.to_string()).collect();
        stopwords.extend(config.extra_stopwords.iter().map(|s| normalize_text(s)));
        Self {
            stopwords,
            min_token_len: config.min_token_len,
        }
    }

    /// Tokens that must appear in a filename. Falls back to the first three
    /// raw tokens when filtering leaves nothing.
    pub fn tokens(&self, client_name: &str) -> Vec<String> {
        let normalized = normalize_text(client_name);
        let raw: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();

        let kept: Vec<String> = raw
            .iter()
            .filter(|t| t.chars().count() >= self.min_token_len && !self.stopwords.contains(**t))
            .map(|t| t.to_string())
            .collect();

        if kept.is_empty() {
            raw.iter().take(FALLBACK_TOKENS).map(|t| t.to_string()).collect()
        } else {
            kept
        }
    }

    /// Documents whose filename contains at least half the client's tokens
    /// (rounded down, minimum one), best score first, ties by filename.
    pub fn rank<'a>(&self, client_name: &str, corpus: &'a [ExtractedDocument]) -> Vec<NameHit<'a>> {
        let tokens = self.tokens(client_name);
        if tokens.is_empty() {
            return Vec::new();
        }
        let threshold = (tokens.len() / 2).max(1);

        let mut hits: Vec<NameHit<'a>> = corpus
            .iter()
            .filter_map(|document| {
                let haystack = normalize_text(filename_stem(&document.filename));
                let score = tokens.iter().filter(|t| haystack.contains(t.as_str())).count();
                (score >= threshold).then_some(NameHit { document, score })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.document.filename.cmp(&b.document.filename))
                .then_with(|| a.document.local_path.cmp(&b.document.local_path))
        });
        hits
    }

    /// Matching documents' local paths, most relevant first.
    pub fn match_name<'a>(
        &self,
        client_name: &str,
        corpus: &'a [ExtractedDocument],
    ) -> Vec<&'a std::path::Path> {
        self.rank(client_name, corpus)
            .into_iter()
            .map(|hit| hit.document.local_path.as_path())
            .collect()
    }
}

/// Lowercase, strip accents, collapse every non-alphanumeric run to one space.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        // Combining marks left over from decomposed input.
        if matches!(ch as u32, 0x0300..=0x036F) {
            continue;
        }
        let folded = fold_accent(ch);
        if folded.is_ascii_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(folded);
        } else {
            pending_space = true;
        }
    }

    out
}

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'ý' | 'ÿ' => 'y',
        _ => ch,
    }
}
