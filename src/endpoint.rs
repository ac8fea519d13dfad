//! Endpoint parsing.
//!
//! parse_endpoint -> Endpoint (http/https base URL)
//! Endpoint::operation_url joins `{service}/{operation}` onto the base.

use std::fmt;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("endpoint string is empty")]
    Empty,
    #[error("endpoint is not a valid URL: {0}")]
    Invalid(String),
    #[error("unsupported endpoint scheme '{0}' (expected http or https)")]
    Scheme(String),
    #[error("endpoint has no host")]
    NoHost,
}

/// A validated service endpoint.
///
/// Retains the original input for diagnostics; the base URL always ends in
/// `/` so relative joins append rather than replace the last segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    original: String,
    base: Url,
}

impl Endpoint {
    /// Returns the original user-supplied form.
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn host(&self) -> &str {
        self.base.host_str().unwrap_or_default()
    }

    pub fn is_tls(&self) -> bool {
        self.base.scheme() == "https"
    }

    /// `{base}/{service}/{operation}`
    pub fn operation_url(&self, service: &str, operation: &str) -> Result<Url, EndpointError> {
        self.base
            .join(&format!("{service}/{operation}"))
            .map_err(|e| EndpointError::Invalid(e.to_string()))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base.as_str().trim_end_matches('/'))
    }
}

/// Parse a `--endpoint` value.
///
/// - "https://iaas.eu-frankfurt-1.example.com" -> https base
/// - "http://localhost:8080/20160918" -> http base with path prefix
/// - "iaas.example.com" (no scheme) -> https assumed
pub fn parse_endpoint(raw: &str) -> Result<Endpoint, EndpointError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EndpointError::Empty);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url = Url::parse(&candidate).map_err(|e| EndpointError::Invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(EndpointError::Scheme(other.to_string())),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(EndpointError::NoHost);
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(Endpoint {
        original: raw.to_string(),
        base: url,
    })
}
