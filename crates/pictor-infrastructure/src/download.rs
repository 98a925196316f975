//! Download glue for edited images.
//!
//! Pure I/O: takes the renderable data URI the session exposes and writes
//! its bytes to disk under the fixed download name.

use std::path::{Path, PathBuf};

use pictor_core::data_uri;
use pictor_core::error::{PictorError, Result};

/// Fixed file name for downloaded edit results.
pub const DOWNLOAD_FILE_NAME: &str = "edited-image.png";

/// Writes an edited-image data URI to `edited-image.png` under `dir`.
///
/// Returns the path of the written file.
pub async fn save_data_uri(uri: &str, dir: &Path) -> Result<PathBuf> {
    let (mime_type, bytes) = data_uri::decode(uri)?;
    let target = dir.join(DOWNLOAD_FILE_NAME);

    tokio::fs::write(&target, &bytes)
        .await
        .map_err(|e| PictorError::io(format!("failed to write {}: {e}", target.display())))?;

    tracing::debug!(
        "saved edited image ({mime_type}, {} bytes) to {}",
        bytes.len(),
        target.display()
    );

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_decoded_bytes_under_the_fixed_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_data_uri("data:image/png;base64,Zm9v", dir.path())
            .await
            .unwrap();

        assert_eq!(path, dir.path().join(DOWNLOAD_FILE_NAME));
        assert_eq!(std::fs::read(&path).unwrap(), b"foo");
    }

    #[tokio::test]
    async fn rejects_non_data_uri_input() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_data_uri("https://example.com/cat.png", dir.path()).await;
        assert!(result.is_err());
    }
}
