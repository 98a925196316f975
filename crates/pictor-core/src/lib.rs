pub mod config;
pub mod data_uri;
pub mod error;
pub mod image;
pub mod secret;
pub mod session;

// Re-export common error type
pub use error::PictorError;
pub use image::{ImageResource, InMemoryImage};
pub use session::{Session, SessionSnapshot, SessionStatus};
