//! On-disk upload store for user-supplied images.
//!
//! Files live in flat per-owner directories under a public static root:
//!
//! ```text
//! <public_root>/uploads/profile-pictures/<user>-<millis>-<rand>.<ext>
//! <public_root>/uploads/characters/<millis>-<rand>.<ext>
//! ```
//!
//! and are addressed by the matching `/uploads/...` URL. Filenames are opaque.

use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use tokio::io::AsyncWriteExt;

/// Directory (and URL segment) under the public root that holds uploads.
pub const UPLOADS_DIR: &str = "uploads";

/// How many fresh names to try before giving up on a collision streak.
const MAX_NAME_ATTEMPTS: u32 = 8;

// ---------------------------------------------------------------------------
// Namespaces
// ---------------------------------------------------------------------------

/// Logical owner of an upload directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadNamespace {
    ProfilePictures,
    Characters,
}

impl UploadNamespace {
    /// Directory name below `uploads/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::ProfilePictures => "profile-pictures",
            Self::Characters => "characters",
        }
    }

    /// Public URL prefix, including the trailing slash.
    pub fn url_prefix(self) -> &'static str {
        match self {
            Self::ProfilePictures => "/uploads/profile-pictures/",
            Self::Characters => "/uploads/characters/",
        }
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Failure while writing to the upload store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to create upload directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write upload {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("no unique filename found after {0} attempts")]
    NamesExhausted(u32),
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Writes images below a public root directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    public_root: PathBuf,
}

impl UploadStore {
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        Self {
            public_root: public_root.into(),
        }
    }

    /// The static root that `/uploads/...` URLs are served from.
    pub fn public_root(&self) -> &Path {
        &self.public_root
    }

    /// Absolute directory for a namespace.
    pub fn namespace_dir(&self, namespace: UploadNamespace) -> PathBuf {
        self.public_root
            .join(UPLOADS_DIR)
            .join(namespace.dir_name())
    }

    /// Write `bytes` under a fresh unique name and return its public URL.
    ///
    /// The namespace directory is created on demand. Names are claimed with
    /// create-new semantics, so two concurrent writers never share a file
    /// even when they generate names within the same millisecond. A write
    /// that fails midway removes its own partial file and leaves every other
    /// file untouched.
    pub async fn write_image(
        &self,
        namespace: UploadNamespace,
        owner_prefix: Option<&str>,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let dir = self.namespace_dir(namespace);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = unique_filename(owner_prefix, extension);
            let path = dir.join(&filename);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(StorageError::Write { path, source }),
            };

            let written = match file.write_all(bytes).await {
                Ok(()) => file.flush().await,
                Err(e) => Err(e),
            };

            if let Err(source) = written {
                drop(file);
                let _ = tokio::fs::remove_file(&path).await;
                return Err(StorageError::Write { path, source });
            }

            tracing::debug!(path = %path.display(), size = bytes.len(), "Upload written");
            return Ok(format!("{}{filename}", namespace.url_prefix()));
        }

        Err(StorageError::NamesExhausted(MAX_NAME_ATTEMPTS))
    }
}

/// Build a filename from the current time in milliseconds and a random
/// 32-bit hex component, optionally prefixed with an owner id.
pub fn unique_filename(owner_prefix: Option<&str>, extension: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let nonce: u32 = rand::rng().random();
    match owner_prefix {
        Some(owner) => format!("{owner}-{millis}-{nonce:08x}.{extension}"),
        None => format!("{millis}-{nonce:08x}.{extension}"),
    }
}
