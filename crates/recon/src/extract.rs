//! Identifier extraction from document filenames.
//!
//! Filenames follow several competing conventions (`NIT._ 900219353 MAKRO`,
//! `RF-84838082-900219353-V`, `... 900219353-1 ...`). Each convention is a
//! [`CandidateStrategy`] producing candidates independently; one scoring pass
//! then picks the winner. Adding or removing a strategy never changes how the
//! others behave.

use std::cmp::Reverse;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfig;
use crate::identifier::{MAX_DIGITS, MIN_DIGITS};
use crate::model::base_name;

/// `NIT`, `N.I.T`, `N I T` not glued to a preceding letter/digit and not
/// followed by another letter.
static NIT_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])(n\.?\s*i\.?\s*t)(?:[^a-z]|$)").expect("static pattern")
});

/// `NIT` at the start of the stem, then dots/underscores/spaces, then digits.
static PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[\s._-]*nit[\s._]*(\d+)").expect("static pattern"));

/// `NIT` / `N.I.T` anywhere, then separators, then digits.
static ANYWHERE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])n\.?\s*i\.?\s*t\.?[\s._-]*(\d+)").expect("static pattern")
});

/// Short alphabetic routing code opening the name, e.g. `RF-8483...`.
static ROUTING_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z]{1,4}[-_]\d").expect("static pattern"));

/// Invoice-number marker ending right before a number: `F_`, `RF_`, `ORF `.
static INVOICE_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])(?:f|rf|orf)[_\s]+$").expect("static pattern")
});

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStrategy {
    /// `NIT` marker at the start of the name.
    Prefix,
    /// `NIT` / `N.I.T` marker anywhere.
    Anywhere,
    /// Standalone `\d{7,10}-\d`; the part before the hyphen.
    CheckDigit,
    /// Names opening with a routing code: the longest 7–10 digit run.
    RoutingCode,
}

impl CandidateStrategy {
    pub const ALL: [Self; 4] = [Self::Prefix, Self::Anywhere, Self::CheckDigit, Self::RoutingCode];

    fn collect(self, stem: &str, out: &mut Vec<Candidate>) {
        let mut push = |digits: &str, position: usize| {
            if is_candidate_len(digits) {
                out.push(Candidate {
                    digits: digits.to_string(),
                    position,
                    strategy: self,
                });
            }
        };

        match self {
            Self::Prefix => {
                if let Some(m) = PREFIX.captures(stem).and_then(|c| c.get(1)) {
                    push(m.as_str(), m.start());
                }
            }
            Self::Anywhere => {
                for m in ANYWHERE.captures_iter(stem).filter_map(|c| c.get(1)) {
                    push(m.as_str(), m.start());
                }
            }
            Self::CheckDigit => {
                for (position, digits) in digit_runs(stem) {
                    if has_check_digit_suffix(&stem[position + digits.len()..]) {
                        push(digits, position);
                    }
                }
            }
            Self::RoutingCode => {
                if !ROUTING_CODE.is_match(stem) {
                    return;
                }
                let longest = digit_runs(stem)
                    .into_iter()
                    .filter(|(_, d)| is_candidate_len(d))
                    .max_by_key(|(pos, d)| (d.len(), Reverse(*pos)));
                if let Some((position, digits)) = longest {
                    push(digits, position);
                }
            }
        }
    }
}

impl std::fmt::Display for CandidateStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prefix => write!(f, "prefix"),
            Self::Anywhere => write!(f, "anywhere"),
            Self::CheckDigit => write!(f, "check_digit"),
            Self::RoutingCode => write!(f, "routing_code"),
        }
    }
}

fn is_candidate_len(digits: &str) -> bool {
    (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len())
}

/// `-D` followed by end of string or a non-digit.
fn has_check_digit_suffix(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    bytes.len() >= 2
        && bytes[0] == b'-'
        && bytes[1].is_ascii_digit()
        && bytes.get(2).map_or(true, |b| !b.is_ascii_digit())
}

/// Maximal ASCII digit runs with their byte offsets.
fn digit_runs(s: &str) -> Vec<(usize, &str)> {
    let bytes = s.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            runs.push((start, &s[start..i]));
        } else {
            i += 1;
        }
    }
    runs
}

/// Base name without a trailing `.ext` (1–5 alphanumerics). A dot followed by
/// anything else, as in `NIT. 900219353`, is part of the name.
pub fn filename_stem(filename: &str) -> &str {
    let base = base_name(filename);
    match base.rfind('.') {
        Some(dot) if dot > 0 => {
            let ext = &base[dot + 1..];
            if (1..=5).contains(&ext.len()) && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                &base[..dot]
            } else {
                base
            }
        }
        _ => base,
    }
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// A digit run considered during extraction. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub digits: String,
    /// Byte offset in the filename stem.
    pub position: usize,
    pub strategy: CandidateStrategy,
}

/// Everything `extract` looked at, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionTrace {
    pub filename: String,
    pub stem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker_position: Option<usize>,
    pub candidates: Vec<Candidate>,
    /// Candidates dropped as invoice numbers.
    pub discarded: Vec<Candidate>,
    pub winner: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IdentifierExtractor {
    strategies: Vec<CandidateStrategy>,
}

impl Default for IdentifierExtractor {
    fn default() -> Self {
        Self::new(CandidateStrategy::ALL.to_vec())
    }
}

impl IdentifierExtractor {
    pub fn new(strategies: Vec<CandidateStrategy>) -> Self {
        Self { strategies }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.strategies.clone())
    }

    pub fn strategies(&self) -> &[CandidateStrategy] {
        &self.strategies
    }

    /// Best identifier candidate in `filename`, if any.
    pub fn extract(&self, filename: &str) -> Option<String> {
        self.explain(filename).winner
    }

    pub fn explain(&self, filename: &str) -> ExtractionTrace {
        let stem = filename_stem(filename);

        let mut candidates: Vec<Candidate> = Vec::new();
        for strategy in &self.strategies {
            let mut found = Vec::new();
            strategy.collect(stem, &mut found);
            for c in found {
                // Same run seen by an earlier strategy: keep the first.
                if !candidates
                    .iter()
                    .any(|k| k.digits == c.digits && k.position == c.position)
                {
                    candidates.push(c);
                }
            }
        }

        let nit_adjacent: Vec<&str> = ANYWHERE
            .captures_iter(stem)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect();

        let (kept, discarded): (Vec<Candidate>, Vec<Candidate>) = candidates
            .iter()
            .cloned()
            .partition(|c| !is_invoice_number(stem, &c.digits) || nit_adjacent.contains(&c.digits.as_str()));

        let marker_position = NIT_MARKER
            .captures(stem)
            .and_then(|c| c.get(1))
            .map(|m| m.start());

        let winner = kept
            .iter()
            .min_by_key(|c| {
                let distance = marker_position.map_or(0, |m| m.abs_diff(c.position));
                (distance, Reverse(c.digits.len()), c.position)
            })
            .map(|c| c.digits.clone())
            .filter(|d| d.len() >= MIN_DIGITS);

        ExtractionTrace {
            filename: filename.to_string(),
            stem: stem.to_string(),
            marker_position,
            candidates,
            discarded,
            winner,
        }
    }
}

/// True when some occurrence of `digits` (as a whole run) directly follows an
/// invoice marker.
fn is_invoice_number(stem: &str, digits: &str) -> bool {
    digit_runs(stem)
        .into_iter()
        .any(|(pos, run)| run == digits && INVOICE_TAIL.is_match(&stem[..pos]))
}
