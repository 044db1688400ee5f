//! Blob storage for uploaded identity and financial documents.
//!
//! Uploads land under `<root>/<kind>/<uuid>.<ext>`. The verification core
//! only ever sees the returned `BlobHandle`; it never reads the bytes.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

use crate::models::{BlobHandle, UploadKind};

/// 10 MB per file.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const DOCUMENT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File type not allowed for {kind} uploads: {extension}")]
    UnsupportedType { kind: UploadKind, extension: String },

    #[error("File content does not match its extension ({detected})")]
    ContentMismatch { detected: String },

    #[error("File too large: {size_mb:.1}MB exceeds {max_mb}MB limit")]
    FileTooLarge { size_mb: f64, max_mb: usize },

    #[error("Empty upload")]
    Empty,
}

/// Destination for uploaded files.
pub trait BlobStore: Send + Sync {
    fn put(&self, kind: UploadKind, file_name: &str, bytes: &[u8]) -> Result<BlobHandle, StorageError>;
}

/// Extensions accepted for each upload kind. Selfies must be images.
pub fn allowed_extensions(kind: UploadKind) -> &'static [&'static str] {
    match kind {
        UploadKind::Selfies => IMAGE_EXTENSIONS,
        UploadKind::Ids | UploadKind::Documents => DOCUMENT_EXTENSIONS,
    }
}

/// Check name, size and content of an upload before it is written.
/// Returns the normalized extension.
pub fn check_upload(kind: UploadKind, file_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
    if bytes.is_empty() {
        return Err(StorageError::Empty);
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(StorageError::FileTooLarge {
            size_mb: bytes.len() as f64 / (1024.0 * 1024.0),
            max_mb: MAX_UPLOAD_BYTES / (1024 * 1024),
        });
    }

    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !allowed_extensions(kind).contains(&extension.as_str()) {
        return Err(StorageError::UnsupportedType { kind, extension });
    }

    // Extensions can lie; the magic bytes have to agree with the guessed type.
    let expected = mime_guess::from_ext(&extension).first_or_octet_stream();
    let detected = detect_mime_from_bytes(bytes);
    if expected.essence_str() != detected {
        return Err(StorageError::ContentMismatch {
            detected: detected.to_string(),
        });
    }

    Ok(extension)
}

/// Sniff the handful of formats we accept.
pub fn detect_mime_from_bytes(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if bytes.starts_with(b"%PDF") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

// ═══════════════════════════════════════════
// Filesystem store
// ═══════════════════════════════════════════

pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a handle produced by this store.
    pub fn resolve(&self, handle: &BlobHandle) -> PathBuf {
        self.root.join(handle.as_str())
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, kind: UploadKind, file_name: &str, bytes: &[u8]) -> Result<BlobHandle, StorageError> {
        let extension = check_upload(kind, file_name, bytes)?;

        let dir = self.root.join(kind.as_str());
        std::fs::create_dir_all(&dir)?;

        let stored_name = format!("{}.{}", Uuid::new_v4(), extension);
        std::fs::write(dir.join(&stored_name), bytes)?;

        tracing::debug!(kind = %kind, size = bytes.len(), "Upload stored");

        Ok(BlobHandle::new(format!("{}/{}", kind.as_str(), stored_name)))
    }
}
