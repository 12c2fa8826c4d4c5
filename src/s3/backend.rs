use crate::{
    pipeline::{Backend, RemoteHash, RemoteObject},
    s3::{
        S3,
        actions::{DeleteObject, HeadObject, ListObjectsV2, PutObject},
        tools::hex_md5_to_base64,
    },
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{collections::BTreeMap, path::Path};

// metadata keys sent as plain headers, everything else is custom metadata
const STANDARD_HEADERS: [&str; 6] = [
    "cache-control",
    "content-disposition",
    "content-encoding",
    "content-language",
    "content-type",
    "expires",
];

#[async_trait]
impl Backend for S3 {
    async fn object_hash(&self, key: &str) -> RemoteHash {
        match HeadObject::new(key).request(self).await {
            Ok(Some(headers)) => stored_hash(&headers)
                .map_or_else(|| RemoteHash::Error("no ETag".to_string()), RemoteHash::Found),
            Ok(None) => RemoteHash::NotFound,
            Err(e) => RemoteHash::Error(format!("{e:#}")),
        }
    }

    async fn upload(
        &self,
        file: &Path,
        key: &str,
        metadata: &BTreeMap<String, String>,
        public: bool,
    ) -> Result<()> {
        let acl = public.then_some("public-read");
        let action = PutObject::new(key, file, acl, Some(object_headers(metadata)));
        let etag = action.request(self).await?;
        log::debug!("{key} stored, ETag: {}", etag.as_deref().unwrap_or("-"));
        Ok(())
    }

    async fn list_objects(&self) -> Result<Vec<RemoteObject>> {
        let mut objects = Vec::new();
        let mut action = ListObjectsV2::new(None);

        loop {
            let page = action.request(self).await?;

            for object in page.contents {
                let created = DateTime::parse_from_rfc3339(&object.last_modified)
                    .with_context(|| {
                        format!(
                            "invalid LastModified for {}: {}",
                            object.key, object.last_modified
                        )
                    })?
                    .with_timezone(&Utc);
                objects.push(RemoteObject::new(&object.key, created));
            }

            match page.next_continuation_token {
                Some(token) if page.is_truncated => action.continuation_token = Some(token),
                _ => break,
            }
        }

        Ok(objects)
    }

    async fn delete_object(&self, key: &str) -> Result<()> {
        DeleteObject::new(key).request(self).await
    }
}

/// Base64 MD5 of the stored object from its `HEAD` response headers
///
/// `x-goog-hash` wins, then the `ETag`. An `ETag` that is not a plain MD5 (multipart
/// uploads) is returned as is so it never matches a local hash.
#[must_use]
pub fn stored_hash(headers: &BTreeMap<String, String>) -> Option<String> {
    let goog_md5 = headers.get("x-goog-hash").and_then(|hashes| {
        hashes
            .split(',')
            .find_map(|hash| hash.trim().strip_prefix("md5="))
            .map(ToString::to_string)
    });

    goog_md5.or_else(|| {
        headers.get("etag").map(|etag| {
            let etag = etag.trim_matches('"');
            hex_md5_to_base64(etag).unwrap_or_else(|| etag.to_string())
        })
    })
}

/// Request headers for the object metadata
#[must_use]
pub fn object_headers(metadata: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    metadata
        .iter()
        .map(|(key, value)| {
            let key = key.to_ascii_lowercase();
            if STANDARD_HEADERS.contains(&key.as_str()) || key.starts_with("x-amz-meta-") {
                (key, value.clone())
            } else {
                (format!("x-amz-meta-{key}"), value.clone())
            }
        })
        .collect()
}
