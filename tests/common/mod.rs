//! Common test helpers for the `MinIO` e2e tests
//!
//! - `MinioContext`: external `MinIO` (`MINIO_ENDPOINT`) or a testcontainer
//! - key and settings file helpers
//! - `s3pub` binary helpers

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

mod helpers;

pub use helpers::minio::{MINIO_ROOT_PASSWORD, MINIO_ROOT_USER, MinioContainer};

use reqwest::Method;
use s3pub::s3::{Credentials, Region, S3, Signature, request, tools};
use secrecy::SecretString;
use std::{env, fs, io::Write, path::Path, process::Command};
use tempfile::{NamedTempFile, TempDir};

/// `MinIO` test context - either external or testcontainer-based
pub enum MinioContext {
    External {
        endpoint: String,
        access_key: String,
        secret_key: String,
    },
    Container(Box<MinioContainer>),
}

impl MinioContext {
    /// Uses the external `MinIO` if `MINIO_ENDPOINT` is set, otherwise starts a container
    pub async fn get_or_start() -> Self {
        if let Ok(endpoint) = env::var("MINIO_ENDPOINT") {
            let access_key =
                env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| MINIO_ROOT_USER.to_string());
            let secret_key =
                env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| MINIO_ROOT_PASSWORD.to_string());

            println!("Using external MinIO at {endpoint}");

            Self::External {
                endpoint,
                access_key,
                secret_key,
            }
        } else {
            println!("Starting MinIO testcontainer");
            let container = MinioContainer::start().await;
            container.wait_for_ready().await.expect("MinIO ready");
            Self::Container(Box::new(container))
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            Self::External { endpoint, .. } => endpoint,
            Self::Container(c) => c.endpoint(),
        }
    }

    pub fn access_key(&self) -> &str {
        match self {
            Self::External { access_key, .. } => access_key,
            Self::Container(c) => &c.access_key,
        }
    }

    pub fn secret_key(&self) -> &str {
        match self {
            Self::External { secret_key, .. } => secret_key,
            Self::Container(c) => &c.secret_key,
        }
    }

    /// Client for `bucket`, `MinIO` ignores the region
    pub fn s3(&self, bucket: &str) -> S3 {
        let credentials = Credentials::new(
            self.access_key(),
            &SecretString::new(self.secret_key().into()),
        );
        S3::new(
            credentials,
            Region::new("us-east-1", self.endpoint()),
            &bucket,
            None,
        )
    }

    /// Signed `PUT /<bucket>`, an existing bucket is fine
    pub async fn create_bucket(&self, bucket: &str) -> anyhow::Result<()> {
        let s3 = self.s3(bucket);
        let url = s3.endpoint()?;
        let mut signature = Signature::new(&s3, "s3", Method::PUT);
        let headers = signature.sign(
            &url,
            tools::sha256_digest("").as_ref(),
            None,
            Some(0),
            None,
        );

        let response = request::request(url, Method::PUT, &headers, None).await?;

        if response.status().is_success() || response.status().as_u16() == 409 {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "Failed to create bucket: {} - {}",
                response.status(),
                response.text().await?
            ))
        }
    }

    /// Key file pointing at this `MinIO`
    pub fn key_file(&self) -> NamedTempFile {
        let mut key_file = NamedTempFile::new().expect("Failed to create key file");
        write!(
            key_file,
            "---\naccess_key: {}\nsecret_key: {}\nendpoint: {}\nregion: us-east-1\n",
            self.access_key(),
            self.secret_key(),
            self.endpoint()
        )
        .expect("Failed to write key file");
        key_file.flush().expect("Failed to flush key file");
        key_file
    }
}

/// Directory with `files` as (relative path, contents)
pub fn create_dist(files: &[(&str, &str)]) -> TempDir {
    let dist = TempDir::new().expect("Failed to create temp dir");
    for (name, contents) in files {
        let path = dist.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create dir");
        }
        fs::write(path, contents).expect("Failed to write file");
    }
    dist
}

/// Run the `s3pub` binary against `MinIO`, `args` come after the global options
pub fn run_s3pub_with_minio(
    minio: &MinioContext,
    bucket: &str,
    args: &[&str],
) -> std::process::Output {
    let key_file = minio.key_file();
    let config_dir = TempDir::new().expect("Failed to create config dir");

    let output = Command::new(env!("CARGO_BIN_EXE_s3pub"))
        .env("HOME", config_dir.path())
        .env_remove("AWS_ACCESS_KEY_ID")
        .env_remove("AWS_SECRET_ACCESS_KEY")
        .args(["--bucket", bucket])
        .arg("--key-filename")
        .arg(key_file.path())
        .args(["--project-id", "e2e"])
        .args(args)
        .output()
        .expect("Failed to execute s3pub");

    drop(key_file);

    output
}

pub fn dist_path(dist: &Path) -> &str {
    dist.to_str().expect("Invalid path")
}
