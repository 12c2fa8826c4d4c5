use crate::pipeline::error::{Error, Result};
use chrono::TimeDelta;
use serde::Deserialize;
use std::{cmp, collections::BTreeMap};

/// One day in milliseconds
pub const DAY: i64 = 86_400_000;

/// Default retention for the sync-delete operation, 7 days in milliseconds
pub const WEEK: i64 = 604_800_000;

/// How the publish operation treats the upload request once it has been issued
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// await the upload and report its outcome
    #[default]
    Wait,
    /// spawn the upload and move on to the next file
    Detach,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub bucket: String,
    /// path to the credentials file
    pub key_filename: String,
    pub project_id: String,
    pub verbose: bool,
    pub simulate: bool,
    pub public: bool,
    pub metadata: BTreeMap<String, String>,
    pub force: bool,
    pub days: Option<i64>,
    pub concurrency: usize,
    pub upload_mode: UploadMode,
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            key_filename: String::new(),
            project_id: String::new(),
            verbose: false,
            simulate: false,
            public: false,
            metadata: BTreeMap::new(),
            force: false,
            days: None,
            concurrency: default_concurrency(),
            upload_mode: UploadMode::default(),
            strict: false,
        }
    }
}

/// physical cpus - 2, at least 1
#[must_use]
pub fn default_concurrency() -> usize {
    cmp::min(
        num_cpus::get_physical().saturating_sub(2).max(1),
        usize::from(u8::MAX),
    )
}

impl Config {
    #[must_use]
    pub fn new(bucket: &str, key_filename: &str, project_id: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            key_filename: key_filename.to_string(),
            project_id: project_id.to_string(),
            ..Self::default()
        }
    }

    /// Check the required options, in order: `bucket`, `key_filename`, `project_id`
    ///
    /// # Errors
    ///
    /// Will return `Error::Configuration` naming the first blank option
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("bucket", &self.bucket),
            ("key_filename", &self.key_filename),
            ("project_id", &self.project_id),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Configuration(field));
            }
        }

        Ok(())
    }

    /// Age an object absent from the publish set must exceed before it is deleted
    #[must_use]
    pub fn retention(&self) -> TimeDelta {
        let week = TimeDelta::milliseconds(WEEK);
        match self.days {
            Some(days) if days > 0 => days
                .checked_mul(DAY)
                .and_then(TimeDelta::try_milliseconds)
                .unwrap_or(week),
            _ => week,
        }
    }

    /// Number of files processed at the same time, never 0
    #[must_use]
    pub fn max_requests(&self) -> usize {
        self.concurrency.max(1)
    }
}
