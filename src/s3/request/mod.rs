use anyhow::Result;
use reqwest::{
    Body, Client, Method, Response,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use std::{collections::BTreeMap, path::Path};
use tokio::fs::File;
use tokio_util::codec::{BytesCodec, FramedRead};
use url::Url;

/// Send a signed request, streaming `file` as the body when given
///
/// # Errors
///
/// Will return `Err` if can not make the request
pub async fn request(
    url: Url,
    method: Method,
    headers: &BTreeMap<String, String>,
    file: Option<&Path>,
) -> Result<Response> {
    let headers = headers
        .iter()
        .map(|(k, v)| Ok((k.parse::<HeaderName>()?, v.parse::<HeaderValue>()?)))
        .collect::<Result<HeaderMap>>()?;

    let client = Client::new();

    let request = if let Some(file_path) = file {
        let file = File::open(file_path).await?;
        let stream = FramedRead::with_capacity(file, BytesCodec::new(), 1024 * 256);
        client
            .request(method, url)
            .headers(headers)
            .body(Body::wrap_stream(stream))
    } else {
        client.request(method, url).headers(headers)
    };

    Ok(request.send().await?)
}
