//! Client loader: first worksheet of a workbook, or a delimited text file.

use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use calamine::{open_workbook_auto, Data, Reader};
use docmatch_recon::config::ColumnAliases;
use docmatch_recon::identifier::{check_digit, is_canonical, normalize};
use docmatch_recon::model::ClientRecord;
use regex::Regex;

use crate::error::IoError;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("static pattern")
});

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xls", "xlsm", "xlsb", "ods"];
const TEXT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Report hyphenated identifiers whose verifier digit does not match.
    pub verify_check_digit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// The row was dropped.
    Rejected,
    /// The row was kept; the value looks suspicious.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub row: usize,
    pub kind: IssueKind,
    pub message: String,
}

impl std::fmt::Display for RowIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.kind {
            IssueKind::Rejected => "rejected",
            IssueKind::Warning => "warning",
        };
        write!(f, "row {} ({tag}): {}", self.row, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientLoad {
    pub clients: Vec<ClientRecord>,
    pub issues: Vec<RowIssue>,
    /// Rows with a blank / `nan` / `none` identifier.
    pub skipped_blank: usize,
}

impl ClientLoad {
    pub fn rejected(&self) -> usize {
        self.issues.iter().filter(|i| i.kind == IssueKind::Rejected).count()
    }
}

/// Rows as text cells, each tagged with its 1-based sheet row.
type Table = Vec<(usize, Vec<String>)>;

/// Load client records from `path`, dispatching on extension.
pub fn load_clients(
    path: &Path,
    aliases: &ColumnAliases,
    options: &LoadOptions,
) -> Result<ClientLoad, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let table = if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        read_workbook(path)?
    } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        let content = read_file_as_utf8(path)?;
        let delimiter = if ext == "tsv" { b'\t' } else { sniff_delimiter(&content) };
        read_delimited(&content, delimiter)?
    } else {
        return Err(IoError::UnsupportedFormat(ext));
    };

    let load = parse_table(&table, aliases, options)?;
    log::info!(
        "loaded {} client(s) from {} ({} rejected, {} blank)",
        load.clients.len(),
        path.display(),
        load.rejected(),
        load.skipped_blank,
    );
    Ok(load)
}

// ---------------------------------------------------------------------------
// Readers
// ---------------------------------------------------------------------------

fn read_workbook(path: &Path) -> Result<Table, IoError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| IoError::Spreadsheet(format!("failed to open workbook: {e}")))?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IoError::Spreadsheet("workbook contains no sheets".into()))?;

    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| IoError::Spreadsheet(format!("failed to read sheet '{first}': {e}")))?;

    // Ranges start at the first used cell, not at A1.
    let row_offset = range.start().map_or(0, |(row, _)| row as usize);

    Ok(range
        .rows()
        .enumerate()
        .map(|(i, cells)| (row_offset + i + 1, cells.iter().map(cell_text).collect()))
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(n) => n.to_string(),
        // Identifier columns typed as numbers come back as floats.
        Data::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        other => other.to_string().trim().to_string(),
    }
}

fn read_delimited(content: &str, delimiter: u8) -> Result<Table, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    // The reader skips blank lines without counting them, so physical line
    // numbers come from the record's byte offset.
    let bytes = content.as_bytes();
    let mut line = 1;
    let mut scanned = 0;

    let mut table = Table::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IoError::Spreadsheet(format!("row {}: {e}", i + 1)))?;
        let row = match record.position() {
            Some(pos) => {
                let start = (pos.byte() as usize).min(bytes.len());
                if start > scanned {
                    line += bytes[scanned..start].iter().filter(|&&b| b == b'\n').count();
                    scanned = start;
                }
                line
            }
            None => i + 1,
        };
        table.push((row, record.iter().map(|f| f.trim().to_string()).collect()));
    }
    Ok(table)
}

/// Read a text file as UTF-8, falling back to Windows-1252 (spreadsheet
/// exports from Excel on Windows).
fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path).map_err(|e| IoError::io(path, e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| IoError::io(path, e))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.trim_start_matches('\u{feff}').to_string()),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// The candidate (`;`, `,`, tab, `|`) giving the most consistent field count
/// over the first lines. Excel in Spanish locales exports with `;`.
fn sniff_delimiter(content: &str) -> u8 {
    let sample: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).take(10).collect();

    let mut best = b',';
    let mut best_score = 0usize;
    for &delim in &[b';', b',', b'\t', b'|'] {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map_or(1, |r| r.len())
            })
            .collect();

        let target = counts.first().copied().unwrap_or(0);
        if target <= 1 {
            continue;
        }
        let score = counts.iter().filter(|&&c| c == target).count() * target;
        if score > best_score {
            best_score = score;
            best = delim;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Rows → clients
// ---------------------------------------------------------------------------

fn header_key(text: &str) -> String {
    text.trim().to_lowercase().replace(' ', "_")
}

fn find_column(headers: &[String], aliases: &[String]) -> Option<usize> {
    aliases.iter().find_map(|alias| {
        let alias = header_key(alias);
        headers.iter().position(|h| *h == alias)
    })
}

fn is_blank_marker(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("none")
}

fn parse_table(
    table: &Table,
    aliases: &ColumnAliases,
    options: &LoadOptions,
) -> Result<ClientLoad, IoError> {
    let Some(header_idx) = table
        .iter()
        .position(|(_, cells)| cells.iter().any(|c| !c.is_empty()))
    else {
        return Err(IoError::MissingColumns(vec![
            "identifier".into(),
            "name".into(),
            "email".into(),
        ]));
    };

    let headers: Vec<String> = table[header_idx].1.iter().map(|h| header_key(h)).collect();
    let id_col = find_column(&headers, &aliases.identifier);
    let name_col = find_column(&headers, &aliases.name);
    let email_col = find_column(&headers, &aliases.email);

    let (id_col, name_col, email_col) = match (id_col, name_col, email_col) {
        (Some(i), Some(n), Some(e)) => (i, n, e),
        _ => {
            let missing = [("identifier", id_col), ("name", name_col), ("email", email_col)]
                .iter()
                .filter(|(_, col)| col.is_none())
                .map(|(label, _)| label.to_string())
                .collect();
            return Err(IoError::MissingColumns(missing));
        }
    };
    log::debug!(
        "client columns: identifier='{}' name='{}' email='{}'",
        headers[id_col],
        headers[name_col],
        headers[email_col]
    );

    let mut load = ClientLoad::default();
    for (row, cells) in &table[header_idx + 1..] {
        let get = |col: usize| cells.get(col).map(|s| s.trim()).unwrap_or("");

        let identifier = get(id_col);
        if is_blank_marker(identifier) {
            load.skipped_blank += 1;
            continue;
        }

        match parse_row(*row, identifier, get(name_col), get(email_col), options, &mut load.issues) {
            Some(client) => load.clients.push(client),
            None => log::debug!("row {row}: rejected"),
        }
    }

    Ok(load)
}

fn parse_row(
    row: usize,
    identifier: &str,
    name: &str,
    emails: &str,
    options: &LoadOptions,
    issues: &mut Vec<RowIssue>,
) -> Option<ClientRecord> {
    let mut reject = |message: String| {
        issues.push(RowIssue {
            row,
            kind: IssueKind::Rejected,
            message,
        });
        None
    };

    let mut valid = Vec::new();
    for email in emails.split([',', ';']).map(str::trim).filter(|e| !e.is_empty()) {
        if !EMAIL.is_match(email) {
            return reject(format!("invalid email '{email}'"));
        }
        valid.push(email.to_string());
    }
    if valid.is_empty() {
        return reject("no valid email".into());
    }
    if is_blank_marker(name) {
        return reject("empty client name".into());
    }

    let normalized = normalize(identifier);
    if !is_canonical(&normalized) {
        issues.push(RowIssue {
            row,
            kind: IssueKind::Warning,
            message: format!("identifier '{identifier}' is not 7-10 digits"),
        });
    } else if options.verify_check_digit {
        if let Some((_, dv)) = identifier.split_once('-') {
            let expected = check_digit(&normalized);
            let given = dv.trim().parse::<u8>().ok();
            if given.is_none() || given != expected {
                issues.push(RowIssue {
                    row,
                    kind: IssueKind::Warning,
                    message: format!(
                        "identifier '{identifier}': check digit should be {}",
                        expected.map_or_else(|| "-".to_string(), |d| d.to_string())
                    ),
                });
            }
        }
    }

    Some(ClientRecord {
        identifier: identifier.to_string(),
        name: name.to_string(),
        emails: valid,
        source_row: row,
    })
}
