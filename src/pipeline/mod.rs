//! Publish and sync-delete operations.
//!
//! Both operations consume a stream of [`InputFile`] and talk to the bucket
//! through a [`Backend`]:
//!
//! * [`Publisher::publish`] uploads the files whose MD5 differs from the stored one
//! * [`Pruner::sync`] deletes the objects that are old and not part of the input

pub mod backend;
pub mod config;
pub mod error;
pub mod file;
pub mod metadata;
pub mod publish;
pub mod prune;

#[cfg(test)]
pub(crate) mod mock;

pub use self::{
    backend::{Backend, RemoteHash, RemoteObject},
    config::{Config, UploadMode},
    error::{Error, Result},
    file::{Contents, InputFile, content_hash, object_key},
    metadata::prepare_metadata,
    prune::{Pruner, SyncReport},
    publish::{Action, DetachedReport, Published, Publisher},
};

use futures::Stream;
use std::sync::Arc;

/// Validate `config` and publish `files`, see [`Publisher::publish`].
/// Uploads spawned in detach mode can not be awaited from here, build a
/// [`Publisher`] to [`Publisher::join_detached`] them.
///
/// # Errors
///
/// Will return `Error::Configuration` before touching the backend if a required option is missing
pub fn publish<S>(
    config: Config,
    backend: Arc<dyn Backend>,
    files: S,
) -> Result<impl Stream<Item = Result<Published>> + Send + 'static>
where
    S: Stream<Item = InputFile> + Send + 'static,
{
    Ok(Publisher::new(config, backend)?.publish(files))
}

/// Validate `config` and run the sync-delete operation, see [`Pruner::sync`]
///
/// # Errors
///
/// Will return `Error::Configuration` if a required option is missing, or
/// `Error::Backend` when `strict` is set and the bucket can not be listed
pub async fn sync<S>(config: Config, backend: Arc<dyn Backend>, files: S) -> Result<SyncReport>
where
    S: Stream<Item = InputFile>,
{
    Pruner::new(config, backend)?.sync(files).await
}
