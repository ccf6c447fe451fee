//! Shared `--archive | --dir` handling for commands that need a corpus.

use std::path::PathBuf;

use clap::Args;
use docmatch_io::{extract_archive, scan_directory, ArchiveOptions};
use docmatch_recon::model::ExtractedDocument;
use tempfile::TempDir;

use crate::CliError;

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false, id = "corpus_source")]
pub struct CorpusSource {
    /// ZIP archive of documents
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Directory of already extracted documents
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CorpusArgs {
    #[command(flatten)]
    pub source: CorpusSource,

    /// Where archive entries are extracted (default: temporary directory
    /// removed on exit)
    #[arg(long, requires = "archive")]
    pub work_dir: Option<PathBuf>,
}

/// Documents on disk. Holds the temporary work directory, if any; the files
/// disappear when this is dropped.
pub struct Corpus {
    pub documents: Vec<ExtractedDocument>,
    _work: Option<TempDir>,
}

pub fn materialize(args: &CorpusArgs, options: &ArchiveOptions) -> Result<Corpus, CliError> {
    if let Some(dir) = &args.source.dir {
        if !dir.is_dir() {
            return Err(CliError::usage(format!("not a directory: {}", dir.display())));
        }
        let documents = scan_directory(dir, options)?;
        return Ok(Corpus { documents, _work: None });
    }

    let Some(archive) = &args.source.archive else {
        return Err(CliError::usage("one of --archive or --dir is required"));
    };
    if !archive.is_file() {
        return Err(CliError::usage(format!("archive not found: {}", archive.display())));
    }

    let (dest, work) = match &args.work_dir {
        Some(dir) => (dir.clone(), None),
        None => {
            let tmp = tempfile::Builder::new()
                .prefix("docmatch-")
                .tempdir()
                .map_err(|e| CliError::general(format!("cannot create work directory: {e}")))?;
            (tmp.path().to_path_buf(), Some(tmp))
        }
    };
    log::debug!("extracting {} into {}", archive.display(), dest.display());

    let documents = extract_archive(archive, &dest, options, None)?;
    Ok(Corpus { documents, _work: work })
}
