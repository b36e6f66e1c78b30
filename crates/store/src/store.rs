//! Whole-document persistence with a single-writer critical section.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use soko_common::{AppError, AppResult};
use tokio::sync::{Mutex, RwLock};

use crate::document::Document;

/// Handle to the persisted document.
///
/// Reads are served from the last successfully saved snapshot. All
/// read-modify-write sequences go through [`DocumentStore::update`], which
/// serializes writers and persists the whole document with
/// write-temp-then-rename, so a failed save can never leave a torn file or a
/// half-applied mutation behind.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    /// Last successfully saved state.
    state: RwLock<Document>,
    /// Serializes read-modify-write sequences.
    writer: Mutex<()>,
    io_timeout: Duration,
}

impl DocumentStore {
    /// Open the store at `path`, creating an empty document if the file does
    /// not exist yet. Legacy follow entries are migrated on load; if any
    /// were migrated the normalized document is written back immediately.
    pub async fn open(path: impl AsRef<Path>, io_timeout: Duration) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();

        let mut document = match load_file(&path, io_timeout).await? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| AppError::StoreUnavailable(format!("corrupt document: {e}")))?,
            None => Document::default(),
        };

        let migrated = document.migrate_follow_entries();
        if migrated > 0 {
            tracing::info!(migrated, "Migrated legacy follow entries to object shape");
        }

        let store = Self {
            inner: Arc::new(Inner {
                path,
                state: RwLock::new(document),
                writer: Mutex::new(()),
                io_timeout,
            }),
        };

        if migrated > 0 {
            let snapshot = store.inner.state.read().await.clone();
            store.persist(&snapshot).await?;
        }

        Ok(store)
    }

    /// Deep copy of the last successfully saved document.
    pub async fn snapshot(&self) -> Document {
        self.inner.state.read().await.clone()
    }

    /// Run a read-modify-write sequence as a single serialized critical
    /// section.
    ///
    /// The closure operates on a copy of the current state. If it returns an
    /// error, nothing is written and the store is unchanged. If it succeeds,
    /// the copy is persisted atomically and becomes the current state only
    /// after the save lands. A closure that leaves the document unchanged
    /// (a no-op mutation) does not touch the disk.
    pub async fn update<T, F>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut Document) -> AppResult<T>,
    {
        let _writer = self.inner.writer.lock().await;

        let before = self.inner.state.read().await.clone();
        let mut working = before.clone();
        let out = f(&mut working)?;

        if working != before {
            self.persist(&working).await?;
            *self.inner.state.write().await = working;
        }

        Ok(out)
    }

    /// Persist a document: serialize, write to a temp file beside the
    /// target, then rename over it.
    async fn persist(&self, document: &Document) -> AppResult<()> {
        let bytes = serde_json::to_vec_pretty(document)
            .map_err(|e| AppError::Internal(format!("serialize document: {e}")))?;

        let path = self.inner.path.clone();
        let tmp = path.with_extension("json.tmp");

        let io = async {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&tmp, &bytes).await?;
            tokio::fs::rename(&tmp, &path).await
        };

        tokio::time::timeout(self.inner.io_timeout, io)
            .await
            .map_err(|_| AppError::StoreUnavailable("document save timed out".to_string()))?
            .map_err(|e| AppError::StoreUnavailable(format!("document save failed: {e}")))
    }
}

/// Read the document file, returning `None` when it does not exist.
async fn load_file(path: &Path, io_timeout: Duration) -> AppResult<Option<Vec<u8>>> {
    let read = tokio::fs::read(path);
    match tokio::time::timeout(io_timeout, read).await {
        Err(_) => Err(AppError::StoreUnavailable(
            "document load timed out".to_string(),
        )),
        Ok(Ok(bytes)) => Ok(Some(bytes)),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Ok(Err(e)) => Err(AppError::StoreUnavailable(format!(
            "document load failed: {e}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::{Role, User};
    use chrono::Utc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn test_user(id: &str, role: Role) -> User {
        User {
            id: id.to_string(),
            username: format!("user_{id}"),
            name: Some(format!("User {id}")),
            profile_image: None,
            role,
            tier: None,
            followers: Vec::new(),
            following: Vec::new(),
            followers_count: 0,
            following_count: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = DocumentStore::open(dir.path().join("soko.json"), TIMEOUT)
            .await
            .unwrap();
        assert!(store.snapshot().await.users.is_empty());
    }

    #[tokio::test]
    async fn test_update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soko.json");

        let store = DocumentStore::open(&path, TIMEOUT).await.unwrap();
        store
            .update(|doc| {
                doc.users.push(test_user("u1", Role::Buyer));
                Ok(())
            })
            .await
            .unwrap();

        // A fresh handle sees the saved state.
        let reopened = DocumentStore::open(&path, TIMEOUT).await.unwrap();
        assert!(reopened.snapshot().await.user("u1").is_some());
    }

    #[tokio::test]
    async fn test_failed_closure_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soko.json");

        let store = DocumentStore::open(&path, TIMEOUT).await.unwrap();
        store
            .update(|doc| {
                doc.users.push(test_user("u1", Role::Buyer));
                Ok(())
            })
            .await
            .unwrap();

        let result: AppResult<()> = store
            .update(|doc| {
                doc.users.push(test_user("u2", Role::Buyer));
                Err(AppError::Validation("rejected".to_string()))
            })
            .await;
        assert!(result.is_err());

        let snapshot = store.snapshot().await;
        assert!(snapshot.user("u2").is_none());
        assert_eq!(snapshot.users.len(), 1);

        // And the file on disk matches.
        let reopened = DocumentStore::open(&path, TIMEOUT).await.unwrap();
        assert_eq!(reopened.snapshot().await.users.len(), 1);
    }

    #[tokio::test]
    async fn test_noop_update_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soko.json");

        let store = DocumentStore::open(&path, TIMEOUT).await.unwrap();
        store
            .update(|doc| {
                doc.users.push(test_user("u1", Role::Buyer));
                Ok(())
            })
            .await
            .unwrap();

        // Remove the file; a no-op update must not recreate it.
        std::fs::remove_file(&path).unwrap();
        store.update(|_doc| Ok(())).await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soko.json");

        let store = DocumentStore::open(&path, TIMEOUT).await.unwrap();
        store
            .update(|doc| {
                doc.users.push(test_user("u1", Role::Buyer));
                Ok(())
            })
            .await
            .unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_legacy_document_migrates_on_open_and_writes_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soko.json");

        // Document written in the legacy bare-id shape.
        let legacy = serde_json::json!({
            "users": [
                {
                    "id": "buyer1",
                    "username": "amina",
                    "name": "Amina",
                    "role": "buyer",
                    "following": ["seller1"],
                    "followingCount": 1,
                    "createdAt": "2025-01-01T00:00:00Z"
                },
                {
                    "id": "seller1",
                    "username": "duka",
                    "name": "Duka",
                    "role": "seller",
                    "followers": ["buyer1"],
                    "followersCount": 1,
                    "createdAt": "2025-01-01T00:00:00Z"
                }
            ]
        });
        std::fs::write(&path, serde_json::to_vec_pretty(&legacy).unwrap()).unwrap();

        let store = DocumentStore::open(&path, TIMEOUT).await.unwrap();
        let doc = store.snapshot().await;
        let entry = &doc.user("seller1").unwrap().followers[0];
        assert_eq!(entry.user_id, "buyer1");
        assert_eq!(entry.name, "Amina");
        assert_eq!(entry.account_type, Role::Buyer);

        // The migrated shape was written back as objects.
        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(raw["users"][1]["followers"][0].is_object());
    }

    #[tokio::test]
    async fn test_concurrent_updates_serialize() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soko.json");
        let store = DocumentStore::open(&path, TIMEOUT).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update(move |doc| {
                        doc.users.push(test_user(&format!("u{i}"), Role::Buyer));
                        Ok(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Every append survived; no last-writer-wins overwrite.
        assert_eq!(store.snapshot().await.users.len(), 10);
    }
}
