//! Corpus builders. Every accepted document is written to disk before the
//! engine sees the corpus.

use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use docmatch_recon::config::ExtractionConfig;
use docmatch_recon::model::ExtractedDocument;
use walkdir::WalkDir;

use crate::error::IoError;

#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Accepted extensions, lowercase, without the dot.
    pub extensions: Vec<String>,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

impl ArchiveOptions {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    fn accepts(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)))
    }
}

fn is_resource_fork(name: &str) -> bool {
    name.split(['/', '\\']).any(|part| part == "__MACOSX")
}

/// Extract every accepted entry of `zip_path` under `dest_dir`, in archive
/// order. Checks `cancel` before each entry.
pub fn extract_archive(
    zip_path: &Path,
    dest_dir: &Path,
    options: &ArchiveOptions,
    cancel: Option<&AtomicBool>,
) -> Result<Vec<ExtractedDocument>, IoError> {
    let file = File::open(zip_path).map_err(|e| IoError::io(zip_path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| IoError::Archive(e.to_string()))?;
    std::fs::create_dir_all(dest_dir).map_err(|e| IoError::io(dest_dir, e))?;

    let mut documents = Vec::new();
    for i in 0..archive.len() {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(IoError::Cancelled {
                extracted: documents.len(),
            });
        }

        let mut entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("skipping archive entry #{i}: {e}");
                continue;
            }
        };
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        if is_resource_fork(&name) || !options.accepts(&name) {
            log::debug!("ignoring archive entry {name}");
            continue;
        }

        // None when the entry would land outside dest_dir.
        let Some(relative) = entry.enclosed_name() else {
            log::warn!("refusing archive entry outside the work directory: {name}");
            continue;
        };
        let target = dest_dir.join(relative);

        let written = target
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|()| File::create(&target))
            .and_then(|mut out| std::io::copy(&mut entry, &mut out));
        match written {
            Ok(bytes) => {
                log::debug!("extracted {name} ({bytes} bytes)");
                documents.push(ExtractedDocument::new(name, target));
            }
            Err(e) => log::warn!("skipping archive entry {name}: {e}"),
        }
    }

    if documents.is_empty() {
        return Err(IoError::NoDocuments);
    }
    log::info!(
        "extracted {} document(s) from {}",
        documents.len(),
        zip_path.display()
    );
    Ok(documents)
}

/// Corpus from an already extracted directory tree, sorted by relative path.
/// Symlinks are not followed, so a link back into the tree cannot repeat files.
pub fn scan_directory(dir: &Path, options: &ArchiveOptions) -> Result<Vec<ExtractedDocument>, IoError> {
    let walker = WalkDir::new(dir).follow_links(false).into_iter();

    let mut documents = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            IoError::io(&path, e)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let relative = relative.to_string_lossy().replace('\\', "/");
        if is_resource_fork(&relative) || !options.accepts(&relative) {
            continue;
        }
        documents.push(ExtractedDocument::new(relative, entry.into_path()));
    }

    if documents.is_empty() {
        return Err(IoError::NoDocuments);
    }
    documents.sort_by(|a, b| a.local_path.cmp(&b.local_path));
    log::info!("found {} document(s) under {}", documents.len(), dir.display());
    Ok(documents)
}
