//! File handles the widget can read selected images from.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;

/// A user-selected file with a declared media type.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Display name of the file.
    fn name(&self) -> &str;

    /// Declared media type, e.g. `image/png`. Not sniffed.
    fn media_type(&self) -> &str;

    /// Read the full content.
    async fn read_all(&self) -> io::Result<Vec<u8>>;
}

/// A file whose content is already in memory.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }
}

#[async_trait]
impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    async fn read_all(&self) -> io::Result<Vec<u8>> {
        Ok(self.bytes.clone())
    }
}

/// A file on the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
    media_type: String,
}

impl DiskFile {
    pub fn new(path: impl Into<PathBuf>, media_type: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            path,
            name,
            media_type: media_type.into(),
        }
    }
}

#[async_trait]
impl FileSource for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn media_type(&self) -> &str {
        &self.media_type
    }

    async fn read_all(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disk_file_reads_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hero.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let file = DiskFile::new(&path, "image/png");
        assert_eq!(file.name(), "hero.png");
        assert_eq!(file.read_all().await.unwrap(), b"\x89PNG");
    }

    #[tokio::test]
    async fn missing_disk_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = DiskFile::new(dir.path().join("gone.png"), "image/png");
        assert!(file.read_all().await.is_err());
    }
}
