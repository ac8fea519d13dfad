//! Output envelope: one per remote call.

use serde_json::{Map, Value, json};

use super::error::DispatchError;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success { selected: Value, raw: Value },
    Failure(DispatchError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub operation: &'static str,
    /// Zero-based page index; always 0 for unpaged operations.
    pub page: usize,
    /// Request body exactly as it was sent.
    pub request: Map<String, Value>,
    pub outcome: Outcome,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    pub fn selected(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Success { selected, .. } => Some(selected),
            Outcome::Failure(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Success { raw, .. } => Some(raw),
            Outcome::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&DispatchError> {
        match &self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure(e) => Some(e),
        }
    }

    /// Machine-readable form, following the CLI's `status: ok|error` shape.
    /// `include_raw` adds the full response next to the selected result.
    pub fn to_json(&self, endpoint: &str, include_raw: bool) -> Value {
        let mut map = Map::new();
        map.insert("operation".into(), json!(self.operation));
        map.insert("endpoint".into(), json!(endpoint));
        map.insert("page".into(), json!(self.page));
        map.insert("request".into(), Value::Object(self.request.clone()));
        match &self.outcome {
            Outcome::Success { selected, raw } => {
                map.insert("status".into(), json!("ok"));
                map.insert("result".into(), selected.clone());
                if include_raw {
                    map.insert("response".into(), raw.clone());
                }
            }
            Outcome::Failure(e) => {
                map.insert("status".into(), json!("error"));
                map.insert("kind".into(), json!(e.kind()));
                map.insert("error".into(), json!(e.to_string()));
            }
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;

    fn envelope(outcome: Outcome) -> Envelope {
        Envelope {
            operation: "GetInstance",
            page: 0,
            request: Map::new(),
            outcome,
        }
    }

    #[test]
    fn success_json_shape() {
        let e = envelope(Outcome::Success {
            selected: json!({"id": "i"}),
            raw: json!({"instance": {"id": "i"}, "etag": "x"}),
        });
        assert!(e.is_success());
        assert!(e.error().is_none());
        let v = e.to_json("https://ep", false);
        assert_eq!(v["status"], "ok");
        assert_eq!(v["result"], json!({"id": "i"}));
        assert!(v.get("response").is_none());
        assert_eq!(e.to_json("https://ep", true)["response"]["etag"], "x");
    }

    #[test]
    fn failure_json_shape() {
        let e = envelope(Outcome::Failure(DispatchError::Transport(TransportError::Cancelled)));
        assert!(e.selected().is_none() && e.raw().is_none());
        let v = e.to_json("https://ep", true);
        assert_eq!(v["status"], "error");
        assert_eq!(v["kind"], "cancelled");
        assert_eq!(v["error"], "request cancelled");
        assert!(v.get("result").is_none());
    }
}
