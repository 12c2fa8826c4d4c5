use serde::Deserialize;
use serde::de::{Deserializer, Error};

/// # Errors
///
/// Will return `Err` if can't deserialize
pub fn bool_deserializer<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(d)?;
    match s.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(D::Error::custom(format!(
            "got {other}, but expected `true` or `false`"
        ))),
    }
}

/// An individual object in a `ListBucketResult`
#[derive(Deserialize, Debug, Clone)]
pub struct Object {
    #[serde(rename = "Key")]
    /// The object's key
    pub key: String,
    #[serde(rename = "LastModified")]
    /// Date and time the object was last modified, RFC 3339
    pub last_modified: String,
    #[serde(rename = "ETag")]
    pub e_tag: Option<String>,
    #[serde(rename = "Size")]
    /// Size in bytes of the object.
    pub size: Option<u64>,
}

/// The parsed result of a `ListObjectsV2` page
#[derive(Deserialize, Debug, Clone)]
pub struct ListBucketResult {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "KeyCount")]
    pub key_count: Option<u64>,
    #[serde(
        rename = "IsTruncated",
        deserialize_with = "bool_deserializer",
        default
    )]
    ///  Specifies whether (true) or not (false) all of the results were returned.
    pub is_truncated: bool,
    #[serde(rename = "NextContinuationToken", default)]
    /// Token to pass as `continuation-token` to fetch the next page
    pub next_continuation_token: Option<String>,
    #[serde(rename = "Contents", default)]
    pub contents: Vec<Object>,
}

#[derive(Deserialize, Debug)]
pub struct ErrorResponse {
    #[serde(rename = "Code")]
    pub code: Option<String>,
    #[serde(rename = "Message")]
    pub message: Option<String>,
    #[serde(rename = "Resource")]
    pub resource: Option<String>,
    #[serde(rename = "RequestId")]
    pub request_id: Option<String>,
}
