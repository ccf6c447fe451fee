//! `docmatch-recon`: NIT extraction and client/document reconciliation.
//!
//! Pure engine crate: receives pre-loaded clients and an already materialized
//! document corpus, returns the partitioned result. No spreadsheet, archive or
//! CLI dependencies; diagnostics go through a caller-supplied
//! [`ReconObserver`](observer::ReconObserver).

pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod extract;
pub mod identifier;
pub mod index;
pub mod matcher;
pub mod model;
pub mod observer;

pub use config::ReconConfig;
pub use engine::{run, Reconciler};
pub use error::ReconError;
pub use extract::{CandidateStrategy, IdentifierExtractor};
pub use index::DocumentIndex;
pub use model::{ClientRecord, ExtractedDocument, MatchMethod, ReconInput, ReconResult};
pub use observer::{LogObserver, NullObserver, ReconObserver};
