//! Actions
//! <https://docs.aws.amazon.com/AmazonS3/latest/API/API_Operations.html>

use crate::s3::{S3, responses::ErrorResponse, signature::Signature};
use anyhow::{Result, anyhow};
use quick_xml::de::from_str;
use reqwest::{Method, Response};
use std::collections::BTreeMap;
use url::Url;

// <https://docs.aws.amazon.com/AmazonS3/latest/API/API_ListObjectsV2.html>
mod listobjectsv2;
pub use self::listobjectsv2::ListObjectsV2;

// <https://docs.aws.amazon.com/AmazonS3/latest/API/API_HeadObject.html>
mod headobject;
pub use self::headobject::HeadObject;

// <https://docs.aws.amazon.com/AmazonS3/latest/API/API_PutObject.html>
mod putobject;
pub use self::putobject::PutObject;

// <https://docs.aws.amazon.com/AmazonS3/latest/API/API_DeleteObject.html>
mod deleteobject;
pub use self::deleteobject::DeleteObject;

pub trait Action {
    // headers to send in the request
    fn headers(&self) -> Option<BTreeMap<&str, &str>>;

    // method to use GET/PUT...
    /// # Errors
    ///
    /// Will return `Err` if the method is not valid
    fn http_method(&self) -> Result<Method>;

    // URL query pairs
    fn query_pairs(&self) -> Option<BTreeMap<&str, &str>>;

    // URL path
    fn path(&self) -> Option<Vec<&str>>;

    /// # Errors
    ///
    /// Will return `Err` if the signature can not be created
    fn sign(
        &self,
        s3: &S3,
        hash_payload: &[u8],
        md5: Option<&[u8]>,
        content_length: Option<usize>,
    ) -> Result<(Url, BTreeMap<String, String>)> {
        let mut url = s3.endpoint()?;

        // object key segments
        if let Some(path) = self.path() {
            url.path_segments_mut()
                .map_err(|()| anyhow!("endpoint URL cannot be a base"))?
                .extend(path);
        }

        if let Some(pairs) = self.query_pairs().filter(|pairs| !pairs.is_empty()) {
            let mut query = url.query_pairs_mut();
            for (k, v) in pairs {
                query.append_pair(k, v);
            }
        }

        // interoperability requests against Cloud Storage name the project
        let mut headers = self.headers().unwrap_or_default();
        if let Some(project_id) = s3.project_id() {
            headers.insert("x-goog-project-id", project_id);
        }

        let mut signature = Signature::new(s3, "s3", self.http_method()?);
        let headers = signature.sign(&url, hash_payload, md5, content_length, Some(headers));
        Ok((url, headers))
    }
}

/// Readable error from a failed response, status plus the S3 error code and message
///
/// # Errors
///
/// Will return `Err` if the body can not be read
pub async fn response_error(response: Response) -> Result<String> {
    let mut error: BTreeMap<&str, String> = BTreeMap::new();
    error.insert("HTTP Status Code", response.status().to_string());

    if let Some(rid) = response.headers().get("x-amz-request-id") {
        error.insert("Request ID", rid.to_str()?.to_string());
    }

    let body = response.text().await?;

    match from_str::<ErrorResponse>(&body) {
        Ok(e) => {
            if let Some(code) = e.code {
                error.insert("Code", code);
            }
            if let Some(message) = e.message {
                error.insert("Message", message);
            }
        }
        Err(_) if body.trim().is_empty() => {}
        Err(_) => {
            error.insert("Response", body);
        }
    }

    Ok(error
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<String>>()
        .join(", "))
}
