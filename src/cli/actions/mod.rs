use crate::{pipeline::Config, s3::S3};
use anyhow::Result;
use std::path::PathBuf;

pub mod publish;
pub mod sync;

#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    Publish { dir: PathBuf },
    Sync { dir: PathBuf },
}

/// # Errors
/// Will return an error if the action fails
pub async fn handle(s3: S3, config: Config, action: Action) -> Result<()> {
    match action {
        Action::Publish { dir } => publish::handle(s3, config, &dir).await,
        Action::Sync { dir } => sync::handle(s3, config, &dir).await,
    }
}
