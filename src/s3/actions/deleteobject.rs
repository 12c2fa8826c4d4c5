use crate::{
    s3::actions::{Action, response_error},
    s3::{S3, request, tools},
};
use anyhow::{Result, anyhow};
use reqwest::Method;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct DeleteObject<'a> {
    key: &'a str,
}

impl<'a> DeleteObject<'a> {
    #[must_use]
    pub const fn new(key: &'a str) -> Self {
        Self { key }
    }

    /// # Errors
    ///
    /// Will return `Err` if can not make the request
    pub async fn request(&self, s3: &S3) -> Result<()> {
        let (url, headers) = &self.sign(s3, tools::sha256_digest("").as_ref(), None, None)?;

        let response = request::request(url.clone(), self.http_method()?, headers, None).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(anyhow!(response_error(response).await?))
        }
    }
}

impl Action for DeleteObject<'_> {
    fn http_method(&self) -> Result<Method> {
        Ok(Method::DELETE)
    }

    fn headers(&self) -> Option<BTreeMap<&str, &str>> {
        None
    }

    fn query_pairs(&self) -> Option<BTreeMap<&str, &str>> {
        None
    }

    fn path(&self) -> Option<Vec<&str>> {
        Some(self.key.split('/').collect())
    }
}
