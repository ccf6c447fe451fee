use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum IoError {
    /// Filesystem failure on a specific path.
    Io { path: PathBuf, message: String },
    /// Extension not handled by any loader.
    UnsupportedFormat(String),
    /// The workbook or delimited file could not be read.
    Spreadsheet(String),
    /// Required client columns not found in the header row.
    MissingColumns(Vec<String>),
    /// The archive could not be opened.
    Archive(String),
    /// The archive or directory held no document with an accepted extension.
    NoDocuments,
    /// Extraction stopped by the caller. No corpus is returned; files already
    /// written stay in the destination directory.
    Cancelled { extracted: usize },
}

impl IoError {
    pub(crate) fn io(path: &Path, err: impl fmt::Display) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
            Self::UnsupportedFormat(ext) => write!(f, "unsupported client file format: '{ext}'"),
            Self::Spreadsheet(msg) => write!(f, "cannot read client file: {msg}"),
            Self::MissingColumns(cols) => {
                write!(f, "missing required column(s): {}", cols.join(", "))
            }
            Self::Archive(msg) => write!(f, "cannot open archive: {msg}"),
            Self::NoDocuments => write!(f, "no documents with an accepted extension found"),
            Self::Cancelled { extracted } => {
                write!(f, "extraction cancelled after {extracted} document(s)")
            }
        }
    }
}

impl std::error::Error for IoError {}
