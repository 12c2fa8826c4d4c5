use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{collections::BTreeMap, path::Path};

/// Outcome of asking the backend for the stored content hash of an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteHash {
    /// base64 encoded MD5
    Found(String),
    NotFound,
    Error(String),
}

impl RemoteHash {
    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        match self {
            Self::Found(hash) => Some(hash),
            Self::NotFound | Self::Error(_) => None,
        }
    }
}

/// An object as returned by a bucket listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    pub key: String,
    pub created: DateTime<Utc>,
}

impl RemoteObject {
    #[must_use]
    pub fn new<K: ToString>(key: &K, created: DateTime<Utc>) -> Self {
        Self {
            key: key.to_string(),
            created,
        }
    }
}

/// Storage operations the publish and sync-delete operations rely on
#[async_trait]
pub trait Backend: Send + Sync {
    /// Stored content hash of `key`
    async fn object_hash(&self, key: &str) -> RemoteHash;

    /// Upload the file at `file` to `key`
    async fn upload(
        &self,
        file: &Path,
        key: &str,
        metadata: &BTreeMap<String, String>,
        public: bool,
    ) -> Result<()>;

    /// Every object in the bucket
    async fn list_objects(&self) -> Result<Vec<RemoteObject>>;

    async fn delete_object(&self, key: &str) -> Result<()>;
}
