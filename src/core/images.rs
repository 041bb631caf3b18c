use std::fs;
use std::path::PathBuf;

use base64ct::{Base64, Encoding};
use uuid::Uuid;

use crate::config::MAX_IMAGE_BYTES;
use crate::core::errors::ApiError;

/// Filesystem-backed blob storage for tweet images and profile pictures.
/// Payloads arrive as base64 inside JSON bodies and are written under the
/// configured image dir with a generated name; stores keep only the name.
pub struct ImageStore {
    root: PathBuf,
}

fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("png")
    } else {
        None
    }
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(ImageStore { root })
    }

    /// Decodes, sniffs and persists an uploaded image. Only JPEG and PNG
    /// payloads are accepted. Returns the stored file name.
    pub fn save(&self, encoded: &str) -> Result<String, ApiError> {
        let bytes = Base64::decode_vec(encoded)
            .map_err(|_| ApiError::BadRequest("Invalid image encoding".to_string()))?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ApiError::BadRequest("Image too large".to_string()));
        }
        let ext = sniff_extension(&bytes)
            .ok_or_else(|| ApiError::BadRequest("Only JPG and PNG images are allowed".to_string()))?;
        let name = format!("{}.{}", Uuid::new_v4(), ext);
        fs::write(self.root.join(&name), &bytes)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;
        Ok(name)
    }

    /// Reads a stored image back. The content type is derived from the
    /// stored file name, not assumed to be one fixed format.
    pub fn load(&self, name: &str) -> Result<(Vec<u8>, String), ApiError> {
        let path = self.root.join(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ApiError::NotFound("Image not found".to_string()));
            }
            Err(e) => return Err(ApiError::InternalError(e.to_string())),
        };
        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();
        Ok((bytes, content_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Smallest valid-enough payloads for format sniffing.
    const JPEG_STUB: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
    const PNG_STUB: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn store() -> (tempfile::TempDir, ImageStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn save_and_load_round_trips_bytes_and_type() {
        let (_dir, store) = store();
        let name = store.save(&Base64::encode_string(JPEG_STUB)).unwrap();
        assert!(name.ends_with(".jpg"));

        let (bytes, content_type) = store.load(&name).unwrap();
        assert_eq!(bytes, JPEG_STUB);
        assert_eq!(content_type, "image/jpeg");
    }

    #[test]
    fn png_gets_its_own_content_type() {
        let (_dir, store) = store();
        let name = store.save(&Base64::encode_string(PNG_STUB)).unwrap();
        assert!(name.ends_with(".png"));
        let (_, content_type) = store.load(&name).unwrap();
        assert_eq!(content_type, "image/png");
    }

    #[test]
    fn save_rejects_non_image_payloads() {
        let (_dir, store) = store();
        assert!(store.save("!!!not base64!!!").is_err());
        assert!(store
            .save(&Base64::encode_string(b"plain text, not an image"))
            .is_err());
    }

    #[test]
    fn load_of_missing_file_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(
            store.load("nope.jpg"),
            Err(ApiError::NotFound(_))
        ));
    }
}
