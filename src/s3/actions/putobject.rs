use crate::{
    s3::actions::{Action, response_error},
    s3::{S3, request, tools::sha256_md5_digest},
};
use anyhow::{Result, anyhow};
use reqwest::Method;
use std::{collections::BTreeMap, path::Path};

#[derive(Debug)]
pub struct PutObject<'a> {
    key: &'a str,
    file: &'a Path,
    acl: Option<&'a str>,
    meta: Option<BTreeMap<String, String>>,
}

impl<'a> PutObject<'a> {
    #[must_use]
    pub const fn new(
        key: &'a str,
        file: &'a Path,
        acl: Option<&'a str>,
        meta: Option<BTreeMap<String, String>>,
    ) -> Self {
        Self {
            key,
            file,
            acl,
            meta,
        }
    }

    /// Upload the file, returns the `ETag` of the new object if any
    ///
    /// # Errors
    ///
    /// Will return `Err` if can not make the request
    pub async fn request(self, s3: &S3) -> Result<Option<String>> {
        let (sha, md5, length) = sha256_md5_digest(self.file).await?;

        let (url, headers) = &self.sign(s3, sha.as_ref(), Some(md5.as_ref()), Some(length))?;

        let response =
            request::request(url.clone(), self.http_method()?, headers, Some(self.file)).await?;

        if response.status().is_success() {
            Ok(response
                .headers()
                .get("ETag")
                .and_then(|etag| etag.to_str().ok())
                .map(ToString::to_string))
        } else {
            Err(anyhow!(response_error(response).await?))
        }
    }
}

impl Action for PutObject<'_> {
    fn http_method(&self) -> Result<Method> {
        Ok(Method::PUT)
    }

    fn headers(&self) -> Option<BTreeMap<&str, &str>> {
        let mut map: BTreeMap<&str, &str> = BTreeMap::new();

        // <https://docs.aws.amazon.com/AmazonS3/latest/userguide/acl-overview.html#canned-acl>
        if let Some(acl) = self.acl {
            map.insert("x-amz-acl", acl);
        }

        if let Some(meta) = &self.meta {
            for (k, v) in meta {
                map.insert(k, v);
            }
        }

        Some(map)
    }

    fn query_pairs(&self) -> Option<BTreeMap<&str, &str>> {
        None
    }

    fn path(&self) -> Option<Vec<&str>> {
        Some(self.key.split('/').collect())
    }
}
