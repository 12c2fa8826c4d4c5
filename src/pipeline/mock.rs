//! In-memory backend recording every call, and a logger capturing every
//! line, for tests

use crate::pipeline::backend::{Backend, RemoteHash, RemoteObject};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ObjectHash(String),
    Upload {
        path: PathBuf,
        key: String,
        metadata: BTreeMap<String, String>,
        public: bool,
    },
    List,
    Delete(String),
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    hashes: Mutex<HashMap<String, RemoteHash>>,
    objects: Mutex<Vec<RemoteObject>>,
    calls: Mutex<Vec<Call>>,
    upload_error: Option<String>,
    list_error: Option<String>,
    delete_error: Option<String>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    completed_uploads: AtomicUsize,
}

impl MemoryBackend {
    pub fn with_objects(objects: Vec<RemoteObject>) -> Self {
        Self {
            objects: Mutex::new(objects),
            ..Self::default()
        }
    }

    pub fn with_upload_error(mut self, err: &str) -> Self {
        self.upload_error = Some(err.to_string());
        self
    }

    pub fn with_list_error(mut self, err: &str) -> Self {
        self.list_error = Some(err.to_string());
        self
    }

    pub fn with_delete_error(mut self, err: &str) -> Self {
        self.delete_error = Some(err.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_hash(&self, key: &str, hash: RemoteHash) {
        self.hashes.lock().unwrap().insert(key.to_string(), hash);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Upload { key, .. } => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        let mut deletes: Vec<String> = self
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(key) => Some(key),
                _ => None,
            })
            .collect();
        deletes.sort();
        deletes
    }

    /// uploads that went through the whole delay
    pub fn completed_uploads(&self) -> usize {
        self.completed_uploads.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn object_hash(&self, key: &str) -> RemoteHash {
        self.enter(Call::ObjectHash(key.to_string())).await;
        let hash = self
            .hashes
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or(RemoteHash::NotFound);
        self.leave();
        hash
    }

    async fn upload(
        &self,
        file: &Path,
        key: &str,
        metadata: &BTreeMap<String, String>,
        public: bool,
    ) -> Result<()> {
        self.enter(Call::Upload {
            path: file.to_path_buf(),
            key: key.to_string(),
            metadata: metadata.clone(),
            public,
        })
        .await;
        self.leave();
        self.completed_uploads.fetch_add(1, Ordering::SeqCst);
        self.upload_error
            .as_ref()
            .map_or(Ok(()), |err| Err(anyhow!("{err}")))
    }

    async fn list_objects(&self) -> Result<Vec<RemoteObject>> {
        self.enter(Call::List).await;
        self.leave();
        match &self.list_error {
            Some(err) => Err(anyhow!("{err}")),
            None => Ok(self.objects.lock().unwrap().clone()),
        }
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        self.enter(Call::Delete(key.to_string())).await;
        self.leave();
        if let Some(err) = &self.delete_error {
            return Err(anyhow!("{err}"));
        }
        self.objects.lock().unwrap().retain(|o| o.key != key);
        Ok(())
    }
}

static LOGGER: CapturedLogs = CapturedLogs {
    lines: Mutex::new(Vec::new()),
};

struct CapturedLogs {
    lines: Mutex<Vec<String>>,
}

impl log::Log for CapturedLogs {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        self.lines.lock().unwrap().push(record.args().to_string());
    }

    fn flush(&self) {}
}

/// Install the capturing logger, tests run in parallel so lines of every
/// test end up in the same buffer
pub fn capture_logs() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}

/// Captured lines starting with `tag` and mentioning `key`
pub fn logged(tag: &str, key: &str) -> Vec<String> {
    LOGGER
        .lines
        .lock()
        .unwrap()
        .iter()
        .filter(|line| line.starts_with(tag) && line.contains(key))
        .cloned()
        .collect()
}
