//! Infrastructure layer for Pictor.
//!
//! File-system and environment adapters: secret loading, file-backed image
//! resources, and the download glue that writes an edited image to disk.

pub mod download;
pub mod file_image;
pub mod secret_service;

pub use download::{DOWNLOAD_FILE_NAME, save_data_uri};
pub use file_image::FileImage;
pub use secret_service::SecretServiceImpl;
