//! File-backed image resource.

use std::path::{Path, PathBuf};

use pictor_core::error::{PictorError, Result};
use pictor_core::image::ImageResource;

/// An image resource backed by a file on disk.
///
/// The media type is inferred from the file name extension via the
/// `mime_guess` library, falling back to `application/octet-stream`. The
/// byte content is never sniffed.
pub struct FileImage {
    path: PathBuf,
    name: String,
    mime_type: String,
}

impl FileImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();

        Self {
            path,
            name,
            mime_type,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ImageResource for FileImage {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    async fn read_bytes(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| PictorError::io(format!("failed to read {}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn declares_mime_type_from_the_file_name() {
        let image = FileImage::new("/tmp/somewhere/cat.png");
        assert_eq!(image.name(), "cat.png");
        assert_eq!(image.mime_type(), "image/png");

        let unknown = FileImage::new("/tmp/somewhere/picture.xyzzy");
        assert_eq!(unknown.mime_type(), "application/octet-stream");
    }

    #[tokio::test]
    async fn reads_bytes_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"jpeg bytes").unwrap();

        let image = FileImage::new(&path);
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.read_bytes().await.unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn missing_file_surfaces_an_io_error() {
        let image = FileImage::new("/definitely/not/here.png");
        let err = image.read_bytes().await.unwrap_err();
        assert!(err.is_io());
    }
}
