use crate::{
    s3::actions::{Action, response_error},
    s3::{S3, request, tools},
};
use anyhow::{Result, anyhow};
use reqwest::{Method, StatusCode};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct HeadObject<'a> {
    key: &'a str,
}

impl<'a> HeadObject<'a> {
    #[must_use]
    pub const fn new(key: &'a str) -> Self {
        Self { key }
    }

    /// Response headers of the object, `None` if the object does not exist
    ///
    /// # Errors
    ///
    /// Will return `Err` if can not make the request
    pub async fn request(&self, s3: &S3) -> Result<Option<BTreeMap<String, String>>> {
        let (url, headers) = &self.sign(s3, tools::sha256_digest("").as_ref(), None, None)?;
        let response = request::request(url.clone(), self.http_method()?, headers, None).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if response.status().is_success() {
            let mut h: BTreeMap<String, String> = BTreeMap::new();
            for (key, value) in response.headers() {
                if value.is_empty() {
                    continue;
                }
                let value = value.to_str()?;
                // x-goog-hash is sent once per algorithm
                h.entry(key.as_str().to_string())
                    .and_modify(|v| {
                        v.push(',');
                        v.push_str(value);
                    })
                    .or_insert_with(|| value.to_string());
            }
            Ok(Some(h))
        } else {
            Err(anyhow!(response_error(response).await?))
        }
    }
}

impl Action for HeadObject<'_> {
    fn http_method(&self) -> Result<Method> {
        Ok(Method::HEAD)
    }

    fn headers(&self) -> Option<BTreeMap<&str, &str>> {
        None
    }

    fn path(&self) -> Option<Vec<&str>> {
        Some(self.key.split('/').collect())
    }

    fn query_pairs(&self) -> Option<BTreeMap<&str, &str>> {
        None
    }
}
