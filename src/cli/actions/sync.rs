use crate::{
    cli::source,
    pipeline::{self, Backend, Config},
    s3::S3,
};
use anyhow::{Result, anyhow};
use colored::Colorize;
use std::{path::Path, sync::Arc};

/// # Errors
/// Will return an error if the directory can not be read, the bucket can not
/// be listed with `strict`, or a delete failed
pub async fn handle(s3: S3, config: Config, dir: &Path) -> Result<()> {
    let paths = source::walk(dir)?;

    log::debug!("{} files in {}", paths.len(), dir.display());

    let simulate = config.simulate;
    let backend: Arc<dyn Backend> = Arc::new(s3);
    let report = pipeline::sync(config, backend, source::keys_only(dir, paths)).await?;

    println!(
        "{} {}: {}, kept: {}, failed: {}",
        "sync".green().bold(),
        if simulate { "would delete" } else { "deleted" },
        report.deleted.len(),
        report.kept.len(),
        report.failed.len(),
    );

    if !report.failed.is_empty() {
        return Err(anyhow!(
            "could not delete: {}",
            report.failed.join(", ")
        ));
    }

    Ok(())
}
