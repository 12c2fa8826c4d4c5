use crate::pipeline::{
    backend::{Backend, RemoteObject},
    config::Config,
    error::{Error, Result},
    file::InputFile,
};
use chrono::{DateTime, TimeDelta, Utc};
use colored::Colorize;
use futures::{Stream, StreamExt, stream};
use std::{collections::HashSet, sync::Arc};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// objects left in place
    pub kept: Vec<String>,
    /// objects deleted, or that would have been with `simulate`
    pub deleted: Vec<String>,
    /// objects the backend refused to delete
    pub failed: Vec<String>,
}

pub struct Pruner {
    config: Config,
    backend: Arc<dyn Backend>,
}

impl Pruner {
    /// # Errors
    ///
    /// Will return `Error::Configuration` if a required option is missing
    pub fn new(config: Config, backend: Arc<dyn Backend>) -> Result<Self> {
        config.validate()?;

        Ok(Self { config, backend })
    }

    /// Drain `files`, then delete the old objects that are not part of them.
    ///
    /// # Errors
    ///
    /// Will return `Error::Backend` if the listing fails and `strict` is set
    pub async fn sync<S>(&self, files: S) -> Result<SyncReport>
    where
        S: Stream<Item = InputFile>,
    {
        let current = collect_keys(files).await;

        log::debug!("current keys: {}", current.len());

        self.reconcile(&current, Utc::now()).await
    }

    /// Compare the bucket against `current` as of `now`
    ///
    /// # Errors
    ///
    /// Will return `Error::Backend` if the listing fails and `strict` is set
    pub async fn reconcile(
        &self,
        current: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> Result<SyncReport> {
        let objects = match self.backend.list_objects().await {
            Ok(objects) => objects,
            Err(err) => {
                if self.config.strict {
                    return Err(Error::backend(&self.config.bucket, &err));
                }
                log::warn!("could not list bucket {}: {err:#}", self.config.bucket);
                Vec::new()
            }
        };

        let threshold = self.config.retention();
        let mut report = SyncReport::default();
        let mut expired = Vec::new();

        for RemoteObject { key, created } in objects {
            let exists = current.contains(&key);
            let old = is_old(created, threshold, now);

            if self.config.verbose {
                let value = format!(
                    "{key} Exists: {exists} Created: {} Old: {old}",
                    created.timestamp_millis()
                );
                log::info!("[del check] {}", value.blue());
            }

            if !exists && old {
                log::info!("[delete] {}", key.red());
                expired.push(key);
            } else {
                report.kept.push(key);
            }
        }

        if self.config.simulate {
            report.deleted = expired;
            return Ok(report);
        }

        let backend = &self.backend;
        let results: Vec<(String, anyhow::Result<()>)> = stream::iter(expired)
            .map(|key| async move {
                let rs = backend.delete_object(&key).await;
                (key, rs)
            })
            .buffer_unordered(self.config.max_requests())
            .collect()
            .await;

        for (key, rs) in results {
            match rs {
                Ok(()) => report.deleted.push(key),
                Err(err) => {
                    log::error!("could not delete {key}: {err:#}");
                    report.failed.push(key);
                }
            }
        }

        Ok(report)
    }
}

/// Keys of every file in `files`
pub async fn collect_keys<S>(files: S) -> HashSet<String>
where
    S: Stream<Item = InputFile>,
{
    files.map(|file| file.key()).collect().await
}

/// `now - (created + threshold) > 0`
#[must_use]
pub fn is_old(created: DateTime<Utc>, threshold: TimeDelta, now: DateTime<Utc>) -> bool {
    created
        .checked_add_signed(threshold)
        .is_some_and(|expires| now > expires)
}
