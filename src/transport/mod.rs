//! Transport seam between the dispatcher and the remote service.
//!
//! The dispatcher only needs three things from below: build a `RemoteCall`,
//! hand it over together with a cancellation token, get a JSON response or a
//! `TransportError` back. `http` is the real implementation; `scripted`
//! replays canned responses in tests.

pub mod http;
#[cfg(test)]
pub mod scripted;

use serde::Deserialize;
use serde_json::{Map, Value};
use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// One remote operation call, fully built.
#[derive(Debug, Clone, Copy)]
pub struct RemoteCall<'a> {
    pub service: &'a str,
    pub operation: &'a str,
    /// Response field that receives the decoded body.
    pub body_field: &'a str,
    pub request: &'a Map<String, Value>,
}

/// Anything that can carry a `RemoteCall` to the service.
pub trait Transport: Send + Sync {
    /// Configured endpoint, used in diagnostics.
    fn endpoint(&self) -> &str;

    /// Perform exactly one call. Implementations observe `cancel` at their
    /// own granularity.
    fn call(
        &self,
        call: RemoteCall<'_>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Value, TransportError>> + Send;
}

/// Error reported by the service itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("service error {status} ({code}): {message}")]
pub struct ServiceFault {
    pub status: u16,
    pub code: String,
    pub message: String,
}

#[derive(Deserialize)]
struct FaultBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ServiceFault {
    /// Build a fault from an HTTP status and response body. Bodies of the
    /// form `{"code": "...", "message": "..."}` are unpacked; anything else
    /// becomes the message verbatim.
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<FaultBody>(body) {
            Ok(parsed) if parsed.code.is_some() || parsed.message.is_some() => ServiceFault {
                status,
                code: parsed.code.unwrap_or_else(|| "Unknown".into()),
                message: parsed.message.unwrap_or_default(),
            },
            _ => ServiceFault {
                status,
                code: "Unknown".into(),
                message: body.trim().to_string(),
            },
        }
    }
}

/// Underlying cause of a connection-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectCause {
    /// The endpoint host name could not be resolved.
    NameResolution { host: String },
    Refused,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("{0}")]
    Service(ServiceFault),
    #[error("connection failed: {message}")]
    Connection {
        message: String,
        cause: Option<ConnectCause>,
    },
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("request cancelled")]
    Cancelled,
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid request: {0}")]
    Request(String),
}

impl TransportError {
    /// Short machine-readable tag used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Service(_) => "service",
            TransportError::Connection { .. } => "connection",
            TransportError::Timeout(_) => "timeout",
            TransportError::Cancelled => "cancelled",
            TransportError::Decode(_) => "decode",
            TransportError::Request(_) => "request",
        }
    }

    /// Host that failed to resolve, if that is what went wrong.
    pub fn unresolved_host(&self) -> Option<&str> {
        match self {
            TransportError::Connection {
                cause: Some(ConnectCause::NameResolution { host }),
                ..
            } => Some(host),
            _ => None,
        }
    }
}

const NAME_RESOLUTION_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "no such host",
    "nodename nor servname",
    "temporary failure in name resolution",
];

/// Walk an error's source chain looking for the root of a connect failure.
pub fn connect_cause(err: &(dyn StdError + 'static), host: &str) -> ConnectCause {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        let text = e.to_string().to_ascii_lowercase();
        if NAME_RESOLUTION_MARKERS.iter().any(|m| text.contains(m)) {
            return ConnectCause::NameResolution { host: host.to_string() };
        }
        if let Some(io) = e.downcast_ref::<std::io::Error>()
            && io.kind() == std::io::ErrorKind::ConnectionRefused
        {
            return ConnectCause::Refused;
        }
        current = e.source();
    }
    ConnectCause::Other(err.to_string())
}

/// Full source chain rendered as `outer: inner: root`.
pub fn chain_message(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        let s = e.to_string();
        if parts.last() != Some(&s) {
            parts.push(s);
        }
        current = e.source();
    }
    parts.join(": ")
}
