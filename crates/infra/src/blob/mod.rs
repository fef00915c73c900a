//! Remote image storage.
//!
//! Product images are uploaded to a blob (object) store when one is configured;
//! the product then references the object's URL.

pub mod http;
pub mod in_memory;

use std::path::Path;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use uuid::Uuid;

use catalog_core::ProductId;

use crate::error::BlobError;

pub use http::HttpBlobStore;
pub use in_memory::InMemoryBlobStore;

/// Object storage for product images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, returning the object's public URL.
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, BlobError>;

    /// Delete the object at `url`. Deleting a missing object succeeds.
    async fn delete(&self, url: &str) -> Result<(), BlobError>;

    /// Whether `url` points into this store.
    fn owns(&self, url: &str) -> bool;
}

/// An image file about to be attached to a product.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl core::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageUpload {
    /// Only `image/*` content with at least one byte is accepted.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self, BlobError> {
        let content_type = content_type.into().trim().to_ascii_lowercase();
        if !content_type.starts_with("image/") || content_type.len() == "image/".len() {
            return Err(BlobError::InvalidUpload(format!(
                "expected an image/* content type, got {content_type:?}"
            )));
        }
        if bytes.is_empty() {
            return Err(BlobError::InvalidUpload("image is empty".to_string()));
        }

        Ok(Self {
            file_name: sanitize_file_name(&file_name.into()),
            content_type,
            bytes,
        })
    }

    /// Read an image from disk, deriving the content type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BlobError> {
        let path = path.as_ref();
        let content_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(content_type_for_extension)
            .ok_or_else(|| {
                BlobError::InvalidUpload(format!("{} is not a recognised image", path.display()))
            })?;
        let bytes = std::fs::read(path).map_err(|source| BlobError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::new(file_name, content_type, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Object key for this image attached to `product_id`.
    ///
    /// `revision` separates successive uploads of the same file name so a new
    /// object never lands on one a product still references.
    pub fn key_for(&self, product_id: &ProductId, revision: Uuid) -> String {
        format!("products/{product_id}/{revision}/{}", self.file_name)
    }

    /// Inline `data:` URL, used when no blob store is configured.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            STANDARD.encode(&self.bytes)
        )
    }
}

fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "bmp" => Some("image/bmp"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

/// Keep `[A-Za-z0-9._-]`, replace everything else with `_`.
fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_images_and_empty_payloads() {
        assert!(matches!(
            ImageUpload::new("a.txt", "text/plain", vec![1]),
            Err(BlobError::InvalidUpload(_))
        ));
        assert!(matches!(
            ImageUpload::new("a.png", "image/", vec![1]),
            Err(BlobError::InvalidUpload(_))
        ));
        assert!(matches!(
            ImageUpload::new("a.png", "image/png", vec![]),
            Err(BlobError::InvalidUpload(_))
        ));
    }

    #[test]
    fn file_names_are_sanitized() {
        let upload = ImageUpload::new("../../my photo (1).PNG", "Image/PNG", vec![1]).unwrap();
        assert_eq!(upload.file_name(), "my_photo__1_.PNG");
        assert_eq!(upload.content_type(), "image/png");

        let hidden = ImageUpload::new("...", "image/png", vec![1]).unwrap();
        assert_eq!(hidden.file_name(), "image");
    }

    #[test]
    fn key_is_scoped_by_product() {
        let upload = ImageUpload::new("cover.jpg", "image/jpeg", vec![1]).unwrap();
        let id: ProductId = "GGWP0007".parse().unwrap();
        let revision = Uuid::nil();
        assert_eq!(
            upload.key_for(&id, revision),
            "products/GGWP0007/00000000-0000-0000-0000-000000000000/cover.jpg"
        );
        assert_ne!(
            upload.key_for(&id, Uuid::now_v7()),
            upload.key_for(&id, Uuid::now_v7())
        );
    }

    #[test]
    fn data_url_is_base64() {
        let upload = ImageUpload::new("dot.png", "image/png", b"hi".to_vec()).unwrap();
        assert_eq!(upload.to_data_url(), "data:image/png;base64,aGk=");
    }

    #[test]
    fn from_path_reads_file_and_guesses_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cover.JPEG");
        std::fs::write(&path, [0xff, 0xd8, 0xff]).unwrap();

        let upload = ImageUpload::from_path(&path).unwrap();
        assert_eq!(upload.content_type(), "image/jpeg");
        assert_eq!(upload.file_name(), "cover.JPEG");
        assert_eq!(upload.bytes(), &[0xff, 0xd8, 0xff]);

        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "x").unwrap();
        assert!(ImageUpload::from_path(&txt).is_err());
        assert!(matches!(
            ImageUpload::from_path(dir.path().join("gone.png")),
            Err(BlobError::Read { .. })
        ));
    }
}
