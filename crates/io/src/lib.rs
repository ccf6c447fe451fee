//! Input side of a reconciliation run: the client spreadsheet and the
//! document archive, turned into the records `docmatch-recon` consumes.

pub mod archive;
pub mod clients;
pub mod error;

pub use archive::{extract_archive, scan_directory, ArchiveOptions};
pub use clients::{load_clients, ClientLoad, IssueKind, LoadOptions, RowIssue};
pub use error::IoError;
