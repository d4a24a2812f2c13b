// ============================
// crates/gatekey-lib/src/credential/store.rs
// ============================
//! Credential storage abstraction with in-memory and flat-file backends.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use tokio::{fs as tokio_fs, io::AsyncWriteExt};

use crate::error::AuthError;
use crate::validation;

/// A stored credential.
///
/// `secret_hash` is a PHC-format string: the algorithm identifier and the
/// cost/salt parameters travel inside it, never the plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Unique, case-sensitive identifier
    pub identifier: String,
    /// Salted one-way hash of the secret
    pub secret_hash: String,
    /// Creation time, unix seconds
    pub created_at: i64,
}

impl Credential {
    pub fn new(identifier: impl Into<String>, secret_hash: String) -> Self {
        Self {
            identifier: identifier.into(),
            secret_hash,
            created_at: Utc::now().timestamp(),
        }
    }
}

/// Trait for credential storage backends.
///
/// Duplicate-identifier rejection is owned here: `insert` is the single
/// place a second registration for an identifier can be turned away.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Store a new credential, rejecting duplicates
    async fn insert(&self, credential: Credential) -> Result<(), AuthError>;

    /// Fetch a credential by identifier
    async fn get(&self, identifier: &str) -> Result<Option<Credential>, AuthError>;

    /// Delete a credential, returning whether it existed
    async fn remove(&self, identifier: &str) -> Result<bool, AuthError>;
}

/// In-memory implementation of the `CredentialStore` trait
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    credentials: Arc<DashMap<String, Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, credential: Credential) -> Result<(), AuthError> {
        match self.credentials.entry(credential.identifier.clone()) {
            Entry::Occupied(_) => Err(AuthError::DuplicateIdentifier(credential.identifier)),
            Entry::Vacant(slot) => {
                slot.insert(credential);
                Ok(())
            },
        }
    }

    async fn get(&self, identifier: &str) -> Result<Option<Credential>, AuthError> {
        Ok(self.credentials.get(identifier).map(|entry| entry.value().clone()))
    }

    async fn remove(&self, identifier: &str) -> Result<bool, AuthError> {
        Ok(self.credentials.remove(identifier).is_some())
    }
}

/// Flat-file implementation of the `CredentialStore` trait.
///
/// One JSON document per identifier under `<root>/credentials/`. The
/// identifier charset is validated before it is used as a file name.
#[derive(Clone)]
pub struct FlatFileCredentialStore {
    root: PathBuf,
}

impl FlatFileCredentialStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("credentials"))?;
        Ok(Self { root })
    }

    fn path_for(&self, identifier: &str) -> PathBuf {
        self.root.join("credentials").join(format!("{identifier}.json"))
    }
}

#[async_trait]
impl CredentialStore for FlatFileCredentialStore {
    async fn insert(&self, credential: Credential) -> Result<(), AuthError> {
        validation::validate_identifier(&credential.identifier)?;
        let path = self.path_for(&credential.identifier);

        // create_new makes the existence check and the write one atomic step
        let mut file = match tokio_fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(AuthError::DuplicateIdentifier(credential.identifier));
            },
            Err(err) => return Err(err.into()),
        };

        let json = serde_json::to_vec(&credential)?;
        file.write_all(&json).await?;
        Ok(())
    }

    async fn get(&self, identifier: &str) -> Result<Option<Credential>, AuthError> {
        if validation::validate_identifier(identifier).is_err() {
            return Ok(None);
        }
        let path = self.path_for(identifier);
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio_fs::read_to_string(&path).await?;
        match serde_json::from_str::<Credential>(&content) {
            Ok(credential) => Ok(Some(credential)),
            Err(err) => {
                tracing::warn!(identifier, %err, "credential record failed to parse");
                Err(AuthError::Integrity(format!(
                    "credential record for {identifier} is corrupt"
                )))
            },
        }
    }

    async fn remove(&self, identifier: &str) -> Result<bool, AuthError> {
        if validation::validate_identifier(identifier).is_err() {
            return Ok(false);
        }
        match tokio_fs::remove_file(self.path_for(identifier)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(identifier: &str) -> Credential {
        Credential::new(identifier, "$scrypt$ln=8,r=8,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string())
    }

    #[tokio::test]
    async fn memory_store_rejects_duplicates() {
        let store = MemoryCredentialStore::new();
        store.insert(credential("u1")).await.unwrap();

        let err = store.insert(credential("u1")).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateIdentifier(id) if id == "u1"));
    }

    #[tokio::test]
    async fn memory_store_get_and_remove() {
        let store = MemoryCredentialStore::new();
        assert!(store.get("missing").await.unwrap().is_none());

        store.insert(credential("u1")).await.unwrap();
        let found = store.get("u1").await.unwrap().unwrap();
        assert_eq!(found.identifier, "u1");

        assert!(store.remove("u1").await.unwrap());
        assert!(!store.remove("u1").await.unwrap());
        assert!(store.get("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn flat_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileCredentialStore::new(dir.path()).unwrap();

        store.insert(credential("u1")).await.unwrap();
        let err = store.insert(credential("u1")).await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateIdentifier(_)));

        let found = store.get("u1").await.unwrap().unwrap();
        assert_eq!(found.identifier, "u1");

        assert!(store.remove("u1").await.unwrap());
        assert!(store.get("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn flat_file_store_flags_corrupt_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileCredentialStore::new(dir.path()).unwrap();

        std::fs::write(
            dir.path().join("credentials").join("u1.json"),
            "not json at all",
        )
        .unwrap();

        let err = store.get("u1").await.unwrap_err();
        assert!(matches!(err, AuthError::Integrity(_)));
    }

    #[tokio::test]
    async fn flat_file_store_ignores_hostile_identifiers() {
        let dir = tempfile::tempdir().unwrap();
        let store = FlatFileCredentialStore::new(dir.path()).unwrap();

        assert!(store.get("../../etc/passwd").await.unwrap().is_none());
        assert!(!store.remove("../../etc/passwd").await.unwrap());
    }
}
