use std::{collections::BTreeMap, path::Path};

pub const CONTENT_TYPE: &str = "content-type";
pub const CONTENT_ENCODING: &str = "content-encoding";

// pre-compressed assets, the mime lookup would only see the `.br` extension
const BROTLI_CONTENT_TYPES: [(&str, &str); 4] = [
    (".js.br", "application/javascript"),
    (".css.br", "text/css"),
    (".svg.br", "image/svg+xml"),
    (".html.br", "text/html"),
];

// `.html.br` is typed but not flagged as encoded
const BROTLI_ENCODED: [&str; 3] = [".js.br", ".css.br", ".svg.br"];

/// Content type for `path`, `None` when the extension is unknown
#[must_use]
pub fn content_type(path: &Path) -> Option<String> {
    let name = path.to_string_lossy();

    BROTLI_CONTENT_TYPES
        .iter()
        .find(|(suffix, _)| name.ends_with(*suffix))
        .map(|(_, mime)| (*mime).to_string())
        .or_else(|| {
            mime_guess::from_path(path)
                .first_raw()
                .map(ToString::to_string)
        })
}

/// `br` for brotli compressed scripts, stylesheets and svg images
#[must_use]
pub fn content_encoding(path: &Path) -> Option<&'static str> {
    let name = path.to_string_lossy();

    BROTLI_ENCODED
        .iter()
        .any(|suffix| name.ends_with(*suffix))
        .then_some("br")
}

/// Metadata sent with the upload, caller `overrides` win over the derived values
#[must_use]
pub fn prepare_metadata(
    path: &Path,
    overrides: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut meta = BTreeMap::new();

    if let Some(content_type) = content_type(path) {
        meta.insert(CONTENT_TYPE.to_string(), content_type);
    }

    if let Some(encoding) = content_encoding(path) {
        meta.insert(CONTENT_ENCODING.to_string(), encoding.to_string());
    }

    for (key, value) in overrides {
        meta.insert(normalize_key(key), value.clone());
    }

    meta
}

/// `contentType`, `Content-Type` and `content_type` all become `content-type`
#[must_use]
pub fn normalize_key(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len() + 4);

    for c in key.trim().chars() {
        if c.is_ascii_uppercase() {
            if !normalized.is_empty() && !normalized.ends_with('-') {
                normalized.push('-');
            }
            normalized.push(c.to_ascii_lowercase());
        } else if c == '_' {
            normalized.push('-');
        } else {
            normalized.push(c);
        }
    }

    normalized
}
