use base64ct::{Base64, Encoding};
use bytes::Bytes;
use std::{
    fmt,
    path::{Path, PathBuf},
    pin::Pin,
};
use tokio::io::AsyncRead;

/// Contents of a file handed over by the upstream step
pub enum Contents {
    /// nothing to publish (directories, placeholders)
    Null,
    /// fully buffered in memory
    Buffer(Bytes),
    /// a live stream, not supported by the publish operation
    Stream(Pin<Box<dyn AsyncRead + Send + Sync>>),
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
            Self::Stream(_) => write!(f, "Stream"),
        }
    }
}

#[derive(Debug)]
pub struct InputFile {
    /// absolute path of the file on disk
    pub path: PathBuf,
    /// directory the object key is relative to
    pub base: PathBuf,
    pub contents: Contents,
}

impl InputFile {
    #[must_use]
    pub fn new<P: Into<PathBuf>, B: Into<PathBuf>>(path: P, base: B, contents: Contents) -> Self {
        Self {
            path: path.into(),
            base: base.into(),
            contents,
        }
    }

    #[must_use]
    pub fn buffered<P: Into<PathBuf>, B: Into<PathBuf>>(
        path: P,
        base: B,
        contents: impl Into<Bytes>,
    ) -> Self {
        Self::new(path, base, Contents::Buffer(contents.into()))
    }

    /// Bucket relative key, see [`object_key`]
    #[must_use]
    pub fn key(&self) -> String {
        object_key(&self.path, &self.base)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self.contents, Contents::Null)
    }

    #[must_use]
    pub const fn is_stream(&self) -> bool {
        matches!(self.contents, Contents::Stream(_))
    }
}

/// Object key for `path`: `base` removed, lower-cased and one leading separator stripped.
#[must_use]
pub fn object_key(path: &Path, base: &Path) -> String {
    object_key_with(path, base, true)
}

#[must_use]
pub fn object_key_with(path: &Path, base: &Path, strip_leading_slash: bool) -> String {
    let path = path.to_string_lossy();
    let base = base.to_string_lossy();

    let key = if base.is_empty() {
        path.to_lowercase()
    } else {
        path.replacen(base.as_ref(), "", 1).to_lowercase()
    };

    if strip_leading_slash {
        key.strip_prefix(['/', '\\']).unwrap_or(&key).to_string()
    } else {
        key
    }
}

/// Base64 encoded MD5 of `contents`, the same value S3 expects in `Content-MD5`
#[must_use]
pub fn content_hash(contents: impl AsRef<[u8]>) -> String {
    Base64::encode_string(&md5::compute(contents).0)
}
