//! Scripted transport: replays queued results and records every call.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use super::{RemoteCall, ServiceFault, Transport, TransportError};

/// What the scripted service does with a call.
pub enum Reply {
    Respond(Result<Value, TransportError>),
    /// Reject with a 400 when any of these request fields is absent,
    /// otherwise answer with the value.
    RequireFields(Vec<&'static str>, Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub service: String,
    pub operation: String,
    pub request: Map<String, Value>,
}

pub struct ScriptedTransport {
    endpoint: String,
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            replies: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn ok(self, value: Value) -> Self {
        self.reply(Reply::Respond(Ok(value)))
    }

    pub fn err(self, error: TransportError) -> Self {
        self.reply(Reply::Respond(Err(error)))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call(&self, call: RemoteCall<'_>, _cancel: &CancellationToken) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            service: call.service.to_string(),
            operation: call.operation.to_string(),
            request: call.request.clone(),
        });
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Respond(result)) => result,
            Some(Reply::RequireFields(fields, value)) => {
                match fields.iter().find(|f| !call.request.contains_key(**f)) {
                    Some(missing) => Err(TransportError::Service(ServiceFault {
                        status: 400,
                        code: "MissingParameter".into(),
                        message: format!("{missing} is required"),
                    })),
                    None => Ok(value),
                }
            }
            None => Err(TransportError::Service(ServiceFault {
                status: 500,
                code: "NoScriptedReply".into(),
                message: "scripted transport ran out of replies".into(),
            })),
        }
    }
}
