use crate::pipeline::{
    backend::{Backend, RemoteHash},
    config::{Config, UploadMode},
    error::{Error, Result},
    file::{Contents, InputFile, content_hash},
    metadata::prepare_metadata,
};
use colored::Colorize;
use futures::{Stream, StreamExt, future};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

/// Uploads spawned in detach mode, `true` once stored
type Detached = Arc<Mutex<Vec<JoinHandle<bool>>>>;

/// What happened to a published file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// remote hash matches, nothing sent
    Skipped,
    Uploaded,
    /// dry run, the upload was not sent
    Simulated,
    /// upload spawned in the background, outcome only logged
    Dispatched,
    Failed(String),
}

/// A file that went through the publish operation, `file` is passed on unchanged
#[derive(Debug)]
pub struct Published {
    pub file: InputFile,
    pub key: String,
    pub action: Action,
}

/// Outcome of the detached uploads, see [`Publisher::join_detached`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetachedReport {
    pub uploaded: usize,
    pub failed: usize,
}

pub struct Publisher {
    config: Arc<Config>,
    backend: Arc<dyn Backend>,
    detached: Detached,
}

impl Publisher {
    /// # Errors
    ///
    /// Will return `Error::Configuration` if a required option is missing
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config: Arc::new(config),
            backend,
            detached: Arc::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Publish every file of `files`, at most `concurrency` of them at a time.
    ///
    /// Results arrive in completion order. Streamed files yield
    /// `Error::UnsupportedInput` and processing goes on, files without
    /// contents are dropped. Detached uploads keep running after the stream
    /// ends, await them with [`Publisher::join_detached`].
    pub fn publish<S>(
        &self,
        files: S,
    ) -> impl Stream<Item = Result<Published>> + Send + 'static + use<S>
    where
        S: Stream<Item = InputFile> + Send + 'static,
    {
        let config = Arc::clone(&self.config);
        let backend = Arc::clone(&self.backend);
        let detached = Arc::clone(&self.detached);
        let max_requests = config.max_requests();

        log::debug!("publish max concurrent requests: {max_requests}");

        files
            .map(move |file| {
                let config = Arc::clone(&config);
                let backend = Arc::clone(&backend);
                let detached = Arc::clone(&detached);
                async move { publish_file(&config, &backend, &detached, file).await }
            })
            .buffer_unordered(max_requests)
            .filter_map(future::ready)
    }

    /// Publish a single file, `None` if it has no contents
    pub async fn publish_file(&self, file: InputFile) -> Option<Result<Published>> {
        publish_file(&self.config, &self.backend, &self.detached, file).await
    }

    /// Wait for every upload spawned in detach mode, including the ones
    /// dispatched while waiting
    pub async fn join_detached(&self) -> DetachedReport {
        let mut report = DetachedReport::default();

        loop {
            let handles = std::mem::take(
                &mut *self
                    .detached
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            );

            if handles.is_empty() {
                break;
            }

            log::debug!("waiting for {} detached uploads", handles.len());

            for handle in handles {
                match handle.await {
                    Ok(true) => report.uploaded += 1,
                    Ok(false) => report.failed += 1,
                    Err(err) => {
                        log::error!("detached upload did not finish: {err}");
                        report.failed += 1;
                    }
                }
            }
        }

        report
    }
}

async fn publish_file(
    config: &Config,
    backend: &Arc<dyn Backend>,
    detached: &Detached,
    file: InputFile,
) -> Option<Result<Published>> {
    let contents = match &file.contents {
        Contents::Null => return None,
        Contents::Stream(_) => {
            log::error!("stream content is not supported: {}", file.path.display());
            return Some(Err(Error::UnsupportedInput { path: file.path }));
        }
        Contents::Buffer(bytes) => bytes,
    };

    let key = file.key();
    let current = content_hash(contents);

    let existing = match backend.object_hash(&key).await {
        RemoteHash::Found(hash) => Some(hash),
        RemoteHash::NotFound => None,
        RemoteHash::Error(err) => {
            if config.strict {
                return Some(Err(Error::Backend { key, message: err }));
            }
            log::warn!("could not get the stored hash of {key}: {err}");
            None
        }
    };

    let unchanged = existing.as_deref() == Some(current.as_str());

    if config.verbose {
        let value = format!(
            "{key} Existing: {} Current: {current} Unchanged: {unchanged}",
            existing.as_deref().unwrap_or("none")
        );
        log::info!("[md5 check] {}", value.yellow());
    }

    if unchanged && !config.force {
        log::info!("[skip] {}", key.cyan());
        return Some(Ok(Published {
            file,
            key,
            action: Action::Skipped,
        }));
    }

    let action = if config.simulate {
        Action::Simulated
    } else {
        upload(config, backend, detached, &file, &key).await
    };

    log::info!("[upload] {}", key.green());

    Some(Ok(Published { file, key, action }))
}

async fn upload(
    config: &Config,
    backend: &Arc<dyn Backend>,
    detached: &Detached,
    file: &InputFile,
    key: &str,
) -> Action {
    let metadata = prepare_metadata(&file.path, &config.metadata);

    log::debug!("upload {key} metadata: {metadata:?}");

    match config.upload_mode {
        UploadMode::Wait => {
            match backend
                .upload(&file.path, key, &metadata, config.public)
                .await
            {
                Ok(()) => Action::Uploaded,
                Err(err) => {
                    log::error!("upload of {key} failed: {err:#}");
                    Action::Failed(format!("{err:#}"))
                }
            }
        }

        UploadMode::Detach => {
            let backend = Arc::clone(backend);
            let path = file.path.clone();
            let key = key.to_string();
            let public = config.public;

            let handle = tokio::spawn(async move {
                match backend.upload(&path, &key, &metadata, public).await {
                    Ok(()) => true,
                    Err(err) => {
                        log::error!("upload of {key} failed: {err:#}");
                        false
                    }
                }
            });

            detached
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(handle);

            Action::Dispatched
        }
    }
}
