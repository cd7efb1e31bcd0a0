use crate::extractor::{extract_paragraphs, DocumentFormat};
use crate::{DocumentFingerprint, IngestError};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

pub fn discover_documents(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        if DocumentFormat::from_path(entry.path()).is_ok() {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

const DOCUMENT_ID_HEX_LEN: usize = 16;

pub fn content_checksum(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

#[derive(Debug)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct IngestionReport {
    pub paragraphs: Vec<String>,
    pub documents: Vec<DocumentFingerprint>,
    pub skipped_files: Vec<SkippedDocument>,
}

// Files are kept as given even when unsupported, so they end up in the skipped list.
pub fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(discover_documents(path));
        } else {
            files.push(path.clone());
        }
    }
    files
}

pub fn ingest_paths_best_effort(paths: &[PathBuf]) -> Result<IngestionReport, IngestError> {
    let files = expand_paths(paths);

    if files.is_empty() {
        return Err(IngestError::InvalidArgument(
            "no documents found to upload".to_string(),
        ));
    }

    let mut paragraphs = Vec::new();
    let mut documents = Vec::new();
    let mut skipped_files = Vec::new();

    for path in files {
        let extracted = extract_paragraphs(&path).and_then(|found| {
            fingerprint_document(&path, found.len()).map(|document| (document, found))
        });

        match extracted {
            Ok((fingerprint, found)) => {
                paragraphs.extend(found);
                documents.push(fingerprint);
            }
            Err(error) => {
                warn!(path = %path.display(), reason = %error, "skipping document");
                skipped_files.push(SkippedDocument {
                    path,
                    reason: error.to_string(),
                });
            }
        }
    }

    Ok(IngestionReport {
        paragraphs,
        documents,
        skipped_files,
    })
}

// Same name and content give the same id, wherever the file was uploaded from.
pub fn fingerprint_document(
    path: &Path,
    paragraph_count: usize,
) -> Result<DocumentFingerprint, IngestError> {
    let title = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| IngestError::MissingFileName(path.display().to_string()))?;
    let checksum = content_checksum(&fs::read(path)?);

    let mut document_id = content_checksum(format!("{title}\0{checksum}").as_bytes());
    document_id.truncate(DOCUMENT_ID_HEX_LEN);

    Ok(DocumentFingerprint {
        document_id,
        title,
        source_path: path.to_string_lossy().to_string(),
        checksum,
        paragraph_count,
        ingested_at: Utc::now(),
    })
}
