use crate::{
    s3::actions::{Action, response_error},
    s3::responses::ListBucketResult,
    s3::{S3, request, tools},
};
use anyhow::{Result, anyhow};
use quick_xml::de::from_str;
use reqwest::Method;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct ListObjectsV2 {
    pub continuation_token: Option<String>,
    pub prefix: Option<String>,
    pub max_keys: Option<String>,
}

impl ListObjectsV2 {
    #[must_use]
    pub fn new(continuation_token: Option<String>) -> Self {
        Self {
            continuation_token,
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Will return `Err` if can not make the request
    pub async fn request(&self, s3: &S3) -> Result<ListBucketResult> {
        let (url, headers) = &self.sign(s3, tools::sha256_digest("").as_ref(), None, None)?;

        let response = request::request(url.clone(), self.http_method()?, headers, None).await?;

        if response.status().is_success() {
            let objects: ListBucketResult = from_str(&response.text().await?)?;
            Ok(objects)
        } else {
            Err(anyhow!(response_error(response).await?))
        }
    }
}

impl Action for ListObjectsV2 {
    fn http_method(&self) -> Result<Method> {
        Ok(Method::GET)
    }

    fn headers(&self) -> Option<BTreeMap<&str, &str>> {
        None
    }

    fn path(&self) -> Option<Vec<&str>> {
        None
    }

    fn query_pairs(&self) -> Option<BTreeMap<&str, &str>> {
        let mut map: BTreeMap<&str, &str> = BTreeMap::new();

        // list-type parameter that indicates version 2 of the API
        map.insert("list-type", "2");

        if let Some(token) = &self.continuation_token {
            map.insert("continuation-token", token);
        }

        if let Some(max_keys) = &self.max_keys {
            map.insert("max-keys", max_keys);
        }

        if let Some(prefix) = &self.prefix {
            map.insert("prefix", prefix);
        }

        Some(map)
    }
}
