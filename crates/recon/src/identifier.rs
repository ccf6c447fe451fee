//! Identifier canonicalization.
//!
//! A canonical identifier is a run of 7–10 ASCII digits. Raw values arrive
//! from spreadsheets (`"900219353-1"`, `"900554896.0"`, `"900.219.353"`) and
//! from filenames; both sides go through [`normalize`] before comparison.

pub const MIN_DIGITS: usize = 7;
pub const MAX_DIGITS: usize = 10;

/// Canonicalize a raw identifier into a digit string.
///
/// - Anything after the first hyphen is a check digit and is dropped.
/// - A spreadsheet float artifact (`"900554896.0"`) is re-rendered as an integer.
/// - All remaining non-digit characters are removed.
///
/// Never truncates by length. Total and idempotent; garbage in yields `""`.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let head = match trimmed.split_once('-') {
        Some((before, _)) => before,
        None => trimmed,
    };

    if head.contains('.') {
        if let Some(rendered) = float_artifact(head) {
            return rendered;
        }
    }

    head.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `"900554896.0"` → `Some("900554896")`. Only integral, non-negative values
/// that survive the f64 round-trip exactly qualify; anything else falls
/// through to character filtering.
fn float_artifact(s: &str) -> Option<String> {
    let value: f64 = s.parse().ok()?;
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value >= 1e15 {
        return None;
    }
    Some(format!("{}", value as u64))
}

/// True for a 7–10 digit ASCII string.
pub fn is_canonical(s: &str) -> bool {
    (MIN_DIGITS..=MAX_DIGITS).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

/// Tolerant ("mirror key") equivalence: the two identifiers differ only by one
/// trailing digit, within the 10↔9 or 9↔8 length pairs. Symmetric.
///
/// Two distinct identifiers that happen to differ only in their last digit are
/// indistinguishable under this relation, so callers must opt in.
pub fn mirrors(a: &str, b: &str) -> bool {
    let (short, long) = if a.len() < b.len() { (a, b) } else { (b, a) };
    if long.len() != short.len() + 1 {
        return false;
    }
    if !matches!((long.len(), short.len()), (10, 9) | (9, 8)) {
        return false;
    }
    is_all_digits(short) && is_all_digits(long) && long.starts_with(short)
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

const DIAN_WEIGHTS: [u32; 15] = [3, 7, 13, 17, 19, 23, 29, 37, 41, 43, 47, 53, 59, 67, 71];

/// DIAN modulo-11 verifier digit for a digit string.
///
/// Returns `None` for empty input, non-digits, or more than 15 digits.
/// Diagnostic only: matching never depends on it.
pub fn check_digit(number: &str) -> Option<u8> {
    if !is_all_digits(number) || number.len() > DIAN_WEIGHTS.len() {
        return None;
    }
    let sum: u32 = number
        .bytes()
        .rev()
        .zip(DIAN_WEIGHTS.iter())
        .map(|(b, w)| u32::from(b - b'0') * w)
        .sum();
    let rem = (sum % 11) as u8;
    Some(if rem < 2 { rem } else { 11 - rem })
}
