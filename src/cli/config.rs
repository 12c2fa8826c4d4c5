use crate::{
    pipeline::Config,
    s3::{Credentials, Region, S3},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::{fs, path::Path};

/// Credentials file referenced by `key_filename`
#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct KeyFile {
    #[serde(default)]
    pub access_key: String,
    #[serde(default)]
    pub secret_key: String,
    pub endpoint: Option<String>,
    pub region: Option<String>,
}

/// Settings file, the YAML form of [`Config`]. An empty file gives the defaults.
///
/// # Errors
///
/// Will return `Err` if the file can not be read or parsed
pub fn load_settings(path: &Path) -> Result<Config> {
    let yaml = fs::read_to_string(path)
        .with_context(|| format!("unable to read settings file: {}", path.display()))?;

    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml_ng::from_str(&yaml)
        .with_context(|| format!("unable to parse settings file: {}", path.display()))
}

impl KeyFile {
    /// # Errors
    ///
    /// Will return `Err` if the file can not be read or parsed
    pub fn new(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)
            .with_context(|| format!("unable to open key file: {}", path.display()))?;

        serde_yaml_ng::from_reader(file)
            .with_context(|| format!("unable to parse key file: {}", path.display()))
    }

    /// Explicit endpoint wins, then an AWS region, then Cloud Storage
    ///
    /// # Errors
    ///
    /// Will return `Err` if the region is not a valid AWS region
    pub fn get_region(&self) -> Result<Region> {
        Ok(match (&self.endpoint, &self.region) {
            (Some(endpoint), region) => {
                Region::new(region.as_deref().unwrap_or("auto"), endpoint)
            }
            (None, Some(region)) if region != "auto" => region.parse::<Region>()?,
            (None, _) => Region::gcs(),
        })
    }

    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            &self.access_key,
            &SecretString::new(self.secret_key.clone().into_boxed_str()),
        )
    }

    /// Client for the configured bucket
    ///
    /// # Errors
    ///
    /// Will return `Err` if the region is not valid
    pub fn s3(&self, config: &Config) -> Result<S3> {
        Ok(S3::new(
            self.credentials(),
            self.get_region()?,
            &config.bucket,
            Some(config.project_id.clone()),
        ))
    }
}
