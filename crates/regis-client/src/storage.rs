//! Object-storage client for student photos.
//!
//! Photos live in a public bucket; the record only stores the object URL.
//! Uploads happen before the student record is written, so a failed upload
//! aborts the save. Deleting the previous photo after a replacement is best
//! effort: an orphaned object is logged, never surfaced.

use thiserror::Error;

use regis_core::validate::{PhotoFormat, ValidationError, validate_photo};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("photo upload failed: {0}")]
    Upload(String),
    #[error("photo delete failed: {0}")]
    Delete(String),
}

/// Client for the photo bucket.
pub struct PhotoStore {
    agent: ureq::Agent,
    bucket_url: String,
}

impl PhotoStore {
    #[must_use]
    pub fn new(bucket_url: impl Into<String>) -> Self {
        let mut bucket_url = bucket_url.into();
        while bucket_url.ends_with('/') {
            bucket_url.pop();
        }
        Self {
            agent: ureq::Agent::new(),
            bucket_url,
        }
    }

    /// Deterministic object name for a student's photo: the ID number with
    /// the sniffed extension, so re-uploads of the same format overwrite.
    #[must_use]
    pub fn object_name(id_number: &str, format: PhotoFormat) -> String {
        format!("{id_number}.{}", format.extension())
    }

    /// Validate and upload photo bytes, returning the public URL to store on
    /// the student record.
    pub fn upload(&self, id_number: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let format = validate_photo(bytes)?;
        let url = self.object_url(&Self::object_name(id_number, format));
        self.agent
            .put(&url)
            .set("Content-Type", format.content_type())
            .send_bytes(bytes)
            .map_err(|e| StorageError::Upload(e.to_string()))?;
        tracing::debug!(url = %url, size = bytes.len(), "photo uploaded");
        Ok(url)
    }

    /// Upload a replacement, then try to remove the old object. The old
    /// object failing to delete does not fail the replacement.
    pub fn replace(
        &self,
        id_number: &str,
        bytes: &[u8],
        old_url: Option<&str>,
    ) -> Result<String, StorageError> {
        let url = self.upload(id_number, bytes)?;
        if let Some(old) = old_url {
            if old != url {
                if let Err(e) = self.delete_url(old) {
                    tracing::warn!(url = old, error = %e, "failed to delete replaced photo");
                }
            }
        }
        Ok(url)
    }

    /// Remove an object by its full URL (used when clearing a photo and when
    /// cleaning up after a replacement).
    pub fn delete_url(&self, url: &str) -> Result<(), StorageError> {
        self.agent
            .delete(url)
            .call()
            .map_err(|e| StorageError::Delete(e.to_string()))?;
        Ok(())
    }

    fn object_url(&self, name: &str) -> String {
        format!("{}/{name}", self.bucket_url)
    }
}
