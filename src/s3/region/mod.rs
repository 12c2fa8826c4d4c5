use regex::Regex;
use std::{error::Error, fmt, str::FromStr};

/// Google Cloud Storage XML API, signed requests use the `auto` region
pub const GCS_ENDPOINT: &str = "storage.googleapis.com";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Region {
    name: String,
    endpoint: String,
}

impl Region {
    #[must_use]
    pub fn new<N: ToString, E: ToString>(name: N, endpoint: E) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    #[must_use]
    pub fn gcs() -> Self {
        Self::new("auto", GCS_ENDPOINT)
    }

    /// Region name used in the signature scope
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// host[:port], may carry an `http://` or `https://` scheme
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.endpoint)
    }
}

// https://docs.aws.amazon.com/general/latest/gr/rande.html#regional-endpoints
impl FromStr for Region {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();

        let aws_region =
            Regex::new(r"^[a-z]{2}(-gov|-iso[a-z]*)?-[a-z]+-[0-9]$").map_err(|_| ParseRegionError::new(s))?;

        if aws_region.is_match(&name) {
            let endpoint = format!("s3.{name}.amazonaws.com");
            Ok(Self::new(name, endpoint))
        } else {
            Err(ParseRegionError::new(s))
        }
    }
}

/// An error produced when attempting to convert a `str` into a `Region` fails.
#[derive(Debug, PartialEq, Eq)]
pub struct ParseRegionError {
    message: String,
}

impl ParseRegionError {
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            message: format!("Not a valid AWS region: {input}"),
        }
    }
}

impl Error for ParseRegionError {}

impl fmt::Display for ParseRegionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
