// Blob storage for uploaded employee images

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::body::Bytes;
use uuid::Uuid;

/// Largest accepted image, in bytes
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Public URL prefix under which stored blobs are served
pub const PUBLIC_PREFIX: &str = "uploads";

#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("Only .jpg, .jpeg and .png images are allowed")]
    UnsupportedType,

    #[error("Image must be 5 MB or smaller")]
    TooLarge,

    #[error("blob storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// An uploaded image that passed extension, content type and size checks
#[derive(Debug, Clone)]
pub struct ImageUpload {
    extension: &'static str,
    bytes: Bytes,
}

impl ImageUpload {
    /// Accept an upload only if both its file name and declared content type
    /// say JPEG or PNG, and it is at most [`MAX_IMAGE_BYTES`].
    pub fn new(file_name: &str, content_type: Option<&str>, bytes: Bytes) -> Result<Self, BlobError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or(BlobError::UnsupportedType)?;

        let extension = match extension.as_str() {
            "jpg" => "jpg",
            "jpeg" => "jpeg",
            "png" => "png",
            _ => return Err(BlobError::UnsupportedType),
        };

        let content_type = content_type
            .map(|ct| ct.trim().to_ascii_lowercase())
            .ok_or(BlobError::UnsupportedType)?;
        let type_matches = match extension {
            "png" => content_type == "image/png",
            _ => content_type == "image/jpeg" || content_type == "image/jpg",
        };
        if !type_matches {
            return Err(BlobError::UnsupportedType);
        }

        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(BlobError::TooLarge);
        }

        Ok(Self { extension, bytes })
    }

    pub fn extension(&self) -> &str {
        self.extension
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Storage for uploaded files. Returns an opaque, retrievable reference.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, upload: &ImageUpload) -> Result<String, BlobError>;

    /// Remove a previously stored blob; unknown references are ignored
    async fn remove(&self, reference: &str) -> Result<(), BlobError>;
}

/// Blob store writing files to a local directory
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map `uploads/<file>` back to a path under the root, refusing anything else
    fn path_for(&self, reference: &str) -> Option<PathBuf> {
        let file_name = reference.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        let is_plain = !file_name.is_empty()
            && file_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
            && !file_name.starts_with('.');
        is_plain.then(|| self.root.join(file_name))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, upload: &ImageUpload) -> Result<String, BlobError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let file_name = format!("{}.{}", Uuid::new_v4(), upload.extension);
        tokio::fs::write(self.root.join(&file_name), &upload.bytes).await?;

        tracing::debug!("Stored image {} ({} bytes)", file_name, upload.len());
        Ok(format!("{}/{}", PUBLIC_PREFIX, file_name))
    }

    async fn remove(&self, reference: &str) -> Result<(), BlobError> {
        let Some(path) = self.path_for(reference) else {
            return Ok(());
        };
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobError::Io(e)),
        }
    }
}
