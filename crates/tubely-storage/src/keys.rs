//! Shared key generation for storage backends.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

use crate::traits::{StorageError, StorageResult};

const TOKEN_BYTES: usize = 32;

/// 32 random bytes, base64url encoded without padding (43 characters).
pub fn random_token() -> String {
    let bytes: [u8; TOKEN_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Key for a processed video: `{prefix}/{token}.{extension}`.
///
/// The prefix is the video's orientation, which partitions the bucket.
pub fn video_key(prefix: &str, token: &str, extension: &str) -> String {
    format!("{}/{}.{}", prefix, token, extension)
}

/// Flat key for a standalone asset such as a thumbnail: `{token}.{extension}`.
pub fn asset_key(token: &str, extension: &str) -> String {
    format!("{}.{}", token, extension)
}

/// Reject keys that could escape the storage root.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            storage_key
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_token_shape() {
        let token = random_token();
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(token, random_token());
    }

    #[test]
    fn test_video_key_uses_prefix() {
        assert_eq!(video_key("landscape", "abc", "mp4"), "landscape/abc.mp4");
        assert_eq!(asset_key("abc", "png"), "abc.png");
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("portrait/abc.mp4").is_ok());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("").is_err());
    }
}
