//! File storage behind the upload endpoints.
//!
//! Only an in-memory backend exists. Objects are addressed by the URL handed
//! back at store time, which is what the upload record keeps.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use uuid::Uuid;

use crate::errors::AppError;

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Location and size of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub size: u64,
    pub content_type: String,
}

/// Last path segment of a client-supplied file name.
///
/// Clients may send `dir/name.txt` or `C:\dir\name.txt`. Stored URLs keep
/// exactly two segments under `/files`.
pub fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
        .trim()
}

/// Backend that keeps uploaded file contents.
pub trait FileStorage: Send + Sync + std::fmt::Debug {
    /// Store `content` under a fresh URL.
    fn store(
        &self,
        file_name: &str,
        content_type: &str,
        content: &[u8],
    ) -> Result<StoredObject, AppError>;

    /// Contents previously stored at `url`.
    fn retrieve(&self, url: &str) -> Result<Vec<u8>, AppError>;

    /// Drop the object at `url`. Returns whether anything was stored there.
    fn remove(&self, url: &str) -> Result<bool, AppError>;
}

/// Keeps file contents in process memory, keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct SimulatedStorage {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl SimulatedStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FileStorage for SimulatedStorage {
    fn store(
        &self,
        file_name: &str,
        content_type: &str,
        content: &[u8],
    ) -> Result<StoredObject, AppError> {
        let file_name = base_name(file_name);
        if file_name.is_empty() {
            return Err(AppError::field("fileName", "fileName is required"));
        }
        if content.is_empty() {
            return Err(AppError::field("file", "file is empty"));
        }
        if content.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::field(
                "file",
                format!("file exceeds {} bytes", MAX_UPLOAD_SIZE),
            ));
        }

        let url = format!("/files/{}/{}", Uuid::new_v4(), file_name);
        let mut objects = self
            .objects
            .write()
            .map_err(|_| AppError::Storage("file storage lock poisoned".to_string()))?;
        objects.insert(url.clone(), content.to_vec());

        tracing::debug!(%url, size = content.len(), "stored upload");
        Ok(StoredObject {
            url,
            size: content.len() as u64,
            content_type: content_type.to_string(),
        })
    }

    fn retrieve(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let objects = self
            .objects
            .read()
            .map_err(|_| AppError::Storage("file storage lock poisoned".to_string()))?;
        objects
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::Storage(format!("no stored object at {}", url)))
    }

    fn remove(&self, url: &str) -> Result<bool, AppError> {
        let mut objects = self
            .objects
            .write()
            .map_err(|_| AppError::Storage("file storage lock poisoned".to_string()))?;
        let removed = objects.remove(url).is_some();
        tracing::debug!(%url, removed, "removed upload contents");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_then_retrieve() {
        let storage = SimulatedStorage::new();
        let stored = storage.store("notes.txt", "text/plain", b"hello").unwrap();

        assert!(stored.url.starts_with("/files/"));
        assert!(stored.url.ends_with("/notes.txt"));
        assert_eq!(stored.size, 5);
        assert_eq!(storage.retrieve(&stored.url).unwrap(), b"hello");
    }

    #[test]
    fn test_same_name_gets_distinct_urls() {
        let storage = SimulatedStorage::new();
        let a = storage.store("a.pdf", "application/pdf", b"1").unwrap();
        let b = storage.store("a.pdf", "application/pdf", b"2").unwrap();
        assert_ne!(a.url, b.url);
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn test_rejects_empty_content() {
        let storage = SimulatedStorage::new();
        let err = storage.store("empty.txt", "text/plain", b"").unwrap_err();
        assert_eq!(err.field_errors()[0].field, "file");
        assert!(storage.is_empty());
    }

    #[test]
    fn test_directory_parts_are_dropped_from_urls() {
        let storage = SimulatedStorage::new();
        let unix = storage.store("notes/week1.txt", "text/plain", b"a").unwrap();
        let windows = storage
            .store("C:\\Users\\ana\\essay.docx", "application/msword", b"b")
            .unwrap();

        assert!(unix.url.ends_with("/week1.txt"));
        assert_eq!(unix.url.matches('/').count(), 3);
        assert!(windows.url.ends_with("/essay.docx"));
        assert_eq!(windows.url.matches('/').count(), 3);
    }

    #[test]
    fn test_name_without_final_segment_is_rejected() {
        let storage = SimulatedStorage::new();
        let err = storage.store("notes/", "text/plain", b"a").unwrap_err();
        assert_eq!(err.field_errors()[0].field, "fileName");
        assert!(storage.is_empty());
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("report.pdf"), "report.pdf");
        assert_eq!(base_name("a/b/report.pdf"), "report.pdf");
        assert_eq!(base_name("a\\report.pdf"), "report.pdf");
        assert_eq!(base_name("../../etc/passwd"), "passwd");
        assert_eq!(base_name("dir/"), "");
    }

    #[test]
    fn test_remove_frees_the_object() {
        let storage = SimulatedStorage::new();
        let stored = storage.store("notes.txt", "text/plain", b"hello").unwrap();
        assert_eq!(storage.len(), 1);

        assert!(storage.remove(&stored.url).unwrap());
        assert!(storage.is_empty());
        assert!(storage.retrieve(&stored.url).is_err());
        assert!(!storage.remove(&stored.url).unwrap());
    }

    #[test]
    fn test_missing_object_is_storage_error() {
        let storage = SimulatedStorage::new();
        assert!(matches!(
            storage.retrieve("/files/nope/x"),
            Err(AppError::Storage(_))
        ));
    }
}
