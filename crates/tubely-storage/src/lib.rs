//! Tubely Storage Library
//!
//! Storage abstraction plus S3 (via `object_store`) and local filesystem backends.
//!
//! # Storage key format
//!
//! Processed videos are stored as `{orientation}/{token}.{ext}`, where the
//! token is 32 random bytes encoded as unpadded base64url. Thumbnails use
//! the flat `{token}.{ext}` form. Keys must not contain `..` or a leading `/`;
//! key generation is centralized in the `keys` module.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use factory::create_asset_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
