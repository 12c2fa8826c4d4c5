use crate::{
    cli::source,
    pipeline::{Action, Backend, Config, DetachedReport, Error, Publisher, UploadMode},
    s3::S3,
};
use anyhow::{Result, anyhow};
use colored::Colorize;
use futures::StreamExt;
use std::{path::Path, pin::pin, sync::Arc};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub skipped: usize,
    pub uploaded: usize,
    pub simulated: usize,
    pub dispatched: usize,
    pub failed: usize,
    pub rejected: usize,
}

impl Summary {
    pub fn add(&mut self, action: &Action) {
        match action {
            Action::Skipped => self.skipped += 1,
            Action::Uploaded => self.uploaded += 1,
            Action::Simulated => self.simulated += 1,
            Action::Dispatched => self.dispatched += 1,
            Action::Failed(_) => self.failed += 1,
        }
    }

    /// Count the detached uploads once they are done
    pub fn add_detached(&mut self, report: DetachedReport) {
        self.uploaded += report.uploaded;
        self.failed += report.failed;
    }
}

/// # Errors
/// Will return an error if the directory can not be read, a backend error
/// occurs with `strict`, or an upload failed
pub async fn handle(s3: S3, config: Config, dir: &Path) -> Result<()> {
    let paths = source::walk(dir)?;

    log::debug!("{} files in {}", paths.len(), dir.display());

    let detach = config.upload_mode == UploadMode::Detach;
    let strict = config.strict;
    let backend: Arc<dyn Backend> = Arc::new(s3);
    let publisher = Publisher::new(config, backend)?;
    let files = source::buffered(dir, paths);
    let mut results = pin!(publisher.publish(files));

    let mut summary = Summary::default();
    let mut abort = None;

    while let Some(rs) = results.next().await {
        match rs {
            Ok(published) => summary.add(&published.action),
            Err(err @ Error::Backend { .. }) if strict => {
                abort = Some(err);
                break;
            }
            Err(err) => {
                log::debug!("{err}");
                summary.rejected += 1;
            }
        }
    }

    if detach {
        log::info!("waiting for {} detached uploads", summary.dispatched);
    }

    summary.add_detached(publisher.join_detached().await);

    if let Some(err) = abort {
        return Err(err.into());
    }

    println!(
        "{} uploaded: {}, skipped: {}, simulated: {}, dispatched: {}, failed: {}, rejected: {}",
        "publish".green().bold(),
        summary.uploaded,
        summary.skipped,
        summary.simulated,
        summary.dispatched,
        summary.failed,
        summary.rejected,
    );

    if summary.failed > 0 {
        return Err(anyhow!("{} uploads failed", summary.failed));
    }

    Ok(())
}
