use anyhow::Result;
use base64ct::{Base64, Encoding};
use futures::stream::TryStreamExt;
use ring::{digest, hmac};
use std::{fmt::Write, path::Path};
use tokio::fs::File;
use tokio_util::codec::{BytesCodec, FramedRead};

/// SHA256 and MD5 of a file plus its length, read in 256KB chunks
///
/// # Errors
///
/// Will return `Err` if can not open the file
pub async fn sha256_md5_digest(file_path: &Path) -> Result<(digest::Digest, [u8; 16], usize)> {
    let file = File::open(file_path).await?;
    let mut stream = FramedRead::with_capacity(file, BytesCodec::new(), 1024 * 256);
    let mut context_sha = digest::Context::new(&digest::SHA256);
    let mut context_md5 = md5::Context::new();
    let mut length: usize = 0;

    while let Some(bytes) = stream.try_next().await? {
        context_sha.update(&bytes);
        context_md5.consume(&bytes);
        length += bytes.len();
    }

    Ok((context_sha.finish(), context_md5.finalize().0, length))
}

#[must_use]
pub fn sha256_digest(input: impl AsRef<[u8]>) -> digest::Digest {
    digest::digest(&digest::SHA256, input.as_ref())
}

#[must_use]
pub fn sha256_digest_string(input: impl AsRef<[u8]>) -> String {
    write_hex_bytes(sha256_digest(input).as_ref())
}

#[must_use]
pub fn sha256_hmac(key: &[u8], msg: &[u8]) -> hmac::Tag {
    let s_key = hmac::Key::new(hmac::HMAC_SHA256, key);
    hmac::sign(&s_key, msg)
}

#[must_use]
pub fn write_hex_bytes(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut s, "{byte:02x}");
    }
    s
}

/// Hex encoded MD5 (an ETag) to base64, `None` if `hex` is not 16 bytes of hex
#[must_use]
pub fn hex_md5_to_base64(hex: &str) -> Option<String> {
    if hex.len() != 32 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let bytes = hex
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
        })
        .collect::<Option<Vec<u8>>>()?;

    Some(Base64::encode_string(&bytes))
}
