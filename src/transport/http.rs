//! HTTP/JSON transport backed by `reqwest`.
//!
//! `POST {endpoint}/{service}/{operation}` with the request map as the JSON
//! body. The decoded body lands under the operation's body field and the
//! well-known `opc-*` / `etag` response headers become sibling fields, so
//! selectors and pagination see a single flat response object.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use super::{ConnectCause, RemoteCall, ServiceFault, Transport, TransportError, chain_message, connect_cause};
use crate::endpoint::Endpoint;

/// Response headers copied into the response object.
const HEADER_FIELDS: &[(&str, &str)] = &[
    ("opc-next-page", "opcNextPage"),
    ("opc-request-id", "opcRequestId"),
    ("opc-work-request-id", "opcWorkRequestId"),
    ("etag", "etag"),
];

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Endpoint,
    display: String,
    headers: HeaderMap,
    timeout: Duration,
}

impl HttpTransport {
    /// `headers` are raw `KEY=VALUE` pairs from the command line.
    pub fn new(endpoint: Endpoint, headers: &[String], timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cloudcmd/", env!("CARGO_PKG_VERSION")))
            .build()?;
        tracing::debug!(
            endpoint = endpoint.original(),
            tls = endpoint.is_tls(),
            timeout_ms = timeout.as_millis() as u64,
            "http transport ready"
        );
        Ok(Self {
            client,
            display: endpoint.to_string(),
            endpoint,
            headers: parse_headers(headers)?,
            timeout,
        })
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            return TransportError::Timeout(self.timeout);
        }
        if err.is_connect() {
            let cause = connect_cause(&err, self.endpoint.host());
            return TransportError::Connection {
                message: chain_message(&err),
                cause: Some(cause),
            };
        }
        if err.is_builder() {
            return TransportError::Request(chain_message(&err));
        }
        // Non-connect send failures can still bottom out in a resolver error.
        match connect_cause(&err, self.endpoint.host()) {
            cause @ ConnectCause::NameResolution { .. } => TransportError::Connection {
                message: chain_message(&err),
                cause: Some(cause),
            },
            _ => TransportError::Connection {
                message: chain_message(&err),
                cause: None,
            },
        }
    }

    async fn send(&self, call: RemoteCall<'_>) -> Result<Value, TransportError> {
        let url = self
            .endpoint
            .operation_url(call.service, call.operation)
            .map_err(|e| TransportError::Request(e.to_string()))?;

        tracing::debug!(%url, operation = call.operation, "sending request");

        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .json(call.request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let header_values: Vec<(&'static str, String)> = HEADER_FIELDS
            .iter()
            .filter_map(|(header, field)| {
                response
                    .headers()
                    .get(*header)
                    .and_then(|v| v.to_str().ok())
                    .map(|v| (*field, v.to_string()))
            })
            .collect();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        tracing::debug!(status = status.as_u16(), bytes = text.len(), "response received");

        if !status.is_success() {
            return Err(TransportError::Service(ServiceFault::from_body(status.as_u16(), &text)));
        }

        shape_response(call.body_field, &text, header_values)
    }
}

impl Transport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.display
    }

    async fn call(&self, call: RemoteCall<'_>, cancel: &CancellationToken) -> Result<Value, TransportError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            result = self.send(call) => result,
        }
    }
}

/// Build the flat response object from body text and captured headers.
///
/// An object body whose keys already include the body field is taken as-is
/// (services that answer with the full envelope); any other body is placed
/// under `body_field`. Headers never overwrite body fields, except when the
/// body field is itself header-backed (`opcWorkRequestId`, `opcRequestId`):
/// then object bodies are merged flat and the header value is authoritative.
fn shape_response(
    body_field: &str,
    text: &str,
    headers: Vec<(&'static str, String)>,
) -> Result<Value, TransportError> {
    let body: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(text).map_err(|e| TransportError::Decode(e.to_string()))?
    };

    let header_backed = HEADER_FIELDS.iter().any(|(_, field)| *field == body_field);
    let mut out = match body {
        Value::Object(map) if header_backed || map.contains_key(body_field) => map,
        other => {
            let mut map = Map::new();
            if !other.is_null() {
                map.insert(body_field.to_string(), other);
            }
            map
        }
    };
    for (field, value) in headers {
        if header_backed && field == body_field {
            out.insert(field.to_string(), Value::String(value));
        } else {
            out.entry(field.to_string()).or_insert(Value::String(value));
        }
    }
    Ok(Value::Object(out))
}

fn parse_headers(raw: &[String]) -> anyhow::Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for kv in raw {
        let Some((k, v)) = kv.split_once('=') else {
            anyhow::bail!("invalid header (expected KEY=VALUE): {kv}");
        };
        let name = HeaderName::from_bytes(k.trim().as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid header name '{}': {e}", k.trim()))?;
        let value = HeaderValue::from_str(v.trim())
            .map_err(|e| anyhow::anyhow!("invalid header value for '{}': {e}", k.trim()))?;
        map.append(name, value);
    }
    Ok(map)
}
