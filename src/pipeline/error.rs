use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required option is missing or blank, nothing has been sent to the backend yet.
    #[error("Missing required configuration: {0}")]
    Configuration(&'static str),

    /// The file was handed over as a live stream instead of a buffer.
    #[error("Stream content is not supported: {}", path.display())]
    UnsupportedInput { path: PathBuf },

    #[error("backend error for \"{key}\": {message}")]
    Backend { key: String, message: String },
}

impl Error {
    pub(crate) fn backend(key: &str, err: &anyhow::Error) -> Self {
        Self::Backend {
            key: key.to_string(),
            message: format!("{err:#}"),
        }
    }
}
