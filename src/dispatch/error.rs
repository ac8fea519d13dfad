//! Dispatch error taxonomy.

use thiserror::Error;

use crate::transport::TransportError;

/// Raised while binding an invocation. Nothing has touched the network yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("unknown operation '{0}' (see `cloudcmd list`)")]
    UnknownOperation(String),
    #[error("{operation}: unknown parameter '{name}'")]
    UnknownParameter { operation: &'static str, name: String },
    #[error("parameter '{0}' supplied more than once")]
    DuplicateParameter(&'static str),
    #[error("invalid select expression '{expr}': {reason}")]
    InvalidSelector { expr: String, reason: &'static str },
    #[error("--select and --pass-thru cannot be combined")]
    ConflictingSelector,
    #[error("{operation}: response has no field '{field}'")]
    UnknownField { operation: &'static str, field: String },
    #[error("{operation}: --pass-thru needs a required parameter to echo")]
    NothingToEcho { operation: &'static str },
    #[error("parameter '{param}': expected {expected}, got '{value}'")]
    InvalidValue {
        param: &'static str,
        expected: String,
        value: String,
    },
}

/// Non-fatal binding finding. The call still goes out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindWarning {
    #[error("required parameter '{param}' was not supplied; the service may reject the request")]
    MissingRequired { param: &'static str },
    #[error("required parameter '{param}' is bound to null; the service may reject the request")]
    RequiredBoundToNull { param: &'static str },
}

/// Failure of a single remote call, captured into an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error(
        "could not resolve host '{host}' for endpoint '{endpoint}'; check the endpoint/region configuration ({source})"
    )]
    Connectivity {
        endpoint: String,
        host: String,
        #[source]
        source: TransportError,
    },
    #[error(transparent)]
    Transport(TransportError),
}

impl DispatchError {
    /// Apply the wrapping policy to a raw transport error.
    pub fn classify(err: TransportError, endpoint: &str) -> Self {
        match err.unresolved_host() {
            Some(host) => DispatchError::Connectivity {
                endpoint: endpoint.to_string(),
                host: host.to_string(),
                source: err,
            },
            None => DispatchError::Transport(err),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Connectivity { .. } => "connectivity",
            DispatchError::Transport(e) => e.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{ConnectCause, ServiceFault};

    #[test]
    fn name_resolution_is_wrapped_with_endpoint() {
        let raw = TransportError::Connection {
            message: "dns error".into(),
            cause: Some(ConnectCause::NameResolution { host: "iaas.nowhere.test".into() }),
        };
        let err = DispatchError::classify(raw.clone(), "https://iaas.nowhere.test");
        assert_eq!(err.kind(), "connectivity");
        let msg = err.to_string();
        assert!(msg.contains("https://iaas.nowhere.test"), "{msg}");
        assert!(msg.contains("iaas.nowhere.test"));
        match err {
            DispatchError::Connectivity { source, .. } => assert_eq!(source, raw),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn other_errors_pass_through() {
        let fault = TransportError::Service(ServiceFault {
            status: 409,
            code: "Conflict".into(),
            message: "etag mismatch".into(),
        });
        let err = DispatchError::classify(fault.clone(), "https://x");
        assert_eq!(err, DispatchError::Transport(fault.clone()));
        assert_eq!(err.to_string(), fault.to_string());

        let refused = TransportError::Connection {
            message: "refused".into(),
            cause: Some(ConnectCause::Refused),
        };
        assert_eq!(
            DispatchError::classify(refused.clone(), "https://x"),
            DispatchError::Transport(refused)
        );
    }

    #[test]
    fn warning_text_names_parameter() {
        let w = BindWarning::RequiredBoundToNull { param: "InstanceId" };
        assert!(w.to_string().contains("'InstanceId'"));
    }
}
