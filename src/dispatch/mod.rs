/*!
Generic operation dispatcher.

One dispatcher serves every operation in the catalog:

  bind(descriptor, raw params, select options, paging mode) -> Invocation
  Dispatcher::invoke(&Invocation, &CancellationToken)       -> Envelope
  Dispatcher::pages(&Invocation, &CancellationToken)        -> Stream<Envelope>

Binding errors are the only errors returned as `Err`; every remote failure
ends up inside an `Envelope`. Each envelope corresponds to exactly one
transport call.
*/

pub mod binding;
pub mod envelope;
pub mod error;
pub mod selector;

use std::time::Instant;

use futures_util::Stream;
use futures_util::stream;
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;

use crate::transport::{RemoteCall, Transport};

pub use binding::{Binding, Invocation, NULL_LITERAL, PagingMode, RawValue, bind};
pub use envelope::{Envelope, Outcome};
pub use error::{BindError, DispatchError};
pub use selector::SelectOptions;

pub struct Dispatcher<T> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// Exactly one call. For paged operations this is the first page only.
    pub async fn invoke(&self, inv: &Invocation, cancel: &CancellationToken) -> Envelope {
        self.call_page(inv, inv.build_request(), 0, cancel).await
    }

    /// Lazily fetch pages, one request in flight at a time.
    ///
    /// Unpaged operations and `PagingMode::Manual` yield a single envelope.
    /// Otherwise the continuation token of each successful page is copied
    /// into the next request until the service stops returning one. A failed
    /// page is yielded and ends the stream.
    pub fn pages<'a>(
        &'a self,
        inv: &'a Invocation,
        cancel: &'a CancellationToken,
    ) -> impl Stream<Item = Envelope> + 'a {
        stream::unfold(Some((inv.build_request(), 0usize)), move |state| async move {
            let (request, page) = state?;
            let envelope = self.call_page(inv, request.clone(), page, cancel).await;
            let next = next_request(inv, &envelope, request).map(|r| (r, page + 1));
            Some((envelope, next))
        })
    }

    async fn call_page(
        &self,
        inv: &Invocation,
        request: Map<String, Value>,
        page: usize,
        cancel: &CancellationToken,
    ) -> Envelope {
        let op = inv.operation();
        let started = Instant::now();
        let result = self
            .transport
            .call(
                RemoteCall {
                    service: op.service,
                    operation: op.name,
                    body_field: op.body_field,
                    request: &request,
                },
                cancel,
            )
            .await;

        let outcome = match result {
            Ok(raw) => Outcome::Success {
                selected: inv.selector().apply(&raw),
                raw,
            },
            Err(e) => {
                let err = DispatchError::classify(e, self.endpoint());
                tracing::debug!(operation = op.name, page, kind = err.kind(), "call failed");
                Outcome::Failure(err)
            }
        };
        tracing::info!(
            operation = op.name,
            page,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = matches!(outcome, Outcome::Success { .. }),
            "call finished"
        );

        Envelope {
            operation: op.name,
            page,
            request,
            outcome,
        }
    }
}

/// Request for the page after `envelope`, if there is one to fetch.
fn next_request(inv: &Invocation, envelope: &Envelope, mut request: Map<String, Value>) -> Option<Map<String, Value>> {
    if inv.paging() == PagingMode::Manual {
        return None;
    }
    let op = inv.operation();
    let paging = op.paging?;
    let token = envelope.raw()?.get(paging.token_field)?.as_str()?.trim();
    if token.is_empty() {
        return None;
    }
    let spec = op.param(paging.token_param)?;
    binding::set_path(&mut request, spec.field, Value::String(token.to_string()));
    Some(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::lookup;
    use crate::transport::scripted::{Reply, ScriptedTransport};
    use crate::transport::{ConnectCause, ServiceFault, TransportError};
    use futures_util::StreamExt;
    use serde_json::json;
    use std::collections::HashMap;

    const ENDPOINT: &str = "https://iaas.eu-test-1.example.com";

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, RawValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), RawValue::Text(v.to_string())))
            .collect()
    }

    fn invocation(op: &str, pairs: &[(&str, &str)], paging: PagingMode) -> Invocation {
        bind(lookup(op).unwrap(), &params(pairs), &SelectOptions::default(), paging).unwrap()
    }

    fn page(items: Value, next: Option<&str>) -> Value {
        let mut v = json!({ "items": items, "opcRequestId": "req" });
        if let Some(t) = next {
            v["opcNextPage"] = json!(t);
        }
        v
    }

    #[tokio::test]
    async fn success_applies_default_selector() {
        let d = Dispatcher::new(
            ScriptedTransport::new(ENDPOINT).ok(json!({"instance": {"id": "i1"}, "etag": "e"})),
        );
        let inv = invocation("GetInstance", &[("InstanceId", "i1")], PagingMode::Auto);
        let env = d.invoke(&inv, &CancellationToken::new()).await;

        assert_eq!(env.selected(), Some(&json!({"id": "i1"})));
        assert_eq!(env.raw().unwrap()["etag"], "e");
        let calls = d.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].service, "core");
        assert_eq!(calls[0].operation, "GetInstance");
        assert_eq!(Value::Object(calls[0].request.clone()), json!({"instanceId": "i1"}));
    }

    #[tokio::test]
    async fn missing_required_reaches_service_and_fails_there() {
        let d = Dispatcher::new(
            ScriptedTransport::new(ENDPOINT).reply(Reply::RequireFields(vec!["instanceId"], json!({}))),
        );
        let inv = invocation("GetInstance", &[], PagingMode::Auto);
        assert_eq!(inv.warnings().len(), 1);

        let env = d.invoke(&inv, &CancellationToken::new()).await;
        assert_eq!(d.transport().calls().len(), 1);
        match env.error() {
            Some(DispatchError::Transport(TransportError::Service(f))) => {
                assert_eq!(f.status, 400);
                assert!(f.message.contains("instanceId"));
            }
            other => panic!("expected service fault, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn identical_inputs_give_identical_envelopes() {
        let response = json!({"vcn": {"id": "v"}, "etag": "1"});
        let d = Dispatcher::new(ScriptedTransport::new(ENDPOINT).ok(response.clone()).ok(response));
        let inv = invocation("UpdateVcn", &[("VcnId", "v"), ("DisplayName", "net")], PagingMode::Auto);
        let cancel = CancellationToken::new();
        let first = d.invoke(&inv, &cancel).await;
        let second = d.invoke(&inv, &cancel).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn auto_pagination_follows_tokens() {
        let d = Dispatcher::new(
            ScriptedTransport::new(ENDPOINT)
                .ok(page(json!([1]), Some("A")))
                .ok(page(json!([2]), Some("B")))
                .ok(page(json!([3]), Some("C")))
                .ok(page(json!([4]), None)),
        );
        let inv = invocation("ListVcns", &[("CompartmentId", "c")], PagingMode::Auto);
        let cancel = CancellationToken::new();
        let envelopes: Vec<Envelope> = d.pages(&inv, &cancel).collect().await;

        let selected: Vec<Value> = envelopes.iter().map(|e| e.selected().cloned().unwrap()).collect();
        assert_eq!(selected, vec![json!([1]), json!([2]), json!([3]), json!([4])]);
        assert_eq!(envelopes.iter().map(|e| e.page).collect::<Vec<_>>(), vec![0, 1, 2, 3]);

        let calls = d.transport().calls();
        assert_eq!(calls.len(), 4);
        let tokens: Vec<Option<&Value>> = calls.iter().map(|c| c.request.get("page")).collect();
        assert_eq!(tokens, vec![None, Some(&json!("A")), Some(&json!("B")), Some(&json!("C"))]);
        assert!(calls.iter().all(|c| c.request.get("compartmentId") == Some(&json!("c"))));
    }

    #[tokio::test]
    async fn three_pages_three_requests() {
        let d = Dispatcher::new(
            ScriptedTransport::new(ENDPOINT)
                .ok(page(json!(["a"]), Some("B")))
                .ok(page(json!(["b"]), Some("C")))
                .ok(page(json!(["c"]), None)),
        );
        let inv = invocation("ListUsers", &[("CompartmentId", "t")], PagingMode::Auto);
        let cancel = CancellationToken::new();
        let envelopes: Vec<Envelope> = d.pages(&inv, &cancel).collect().await;
        assert_eq!(envelopes.len(), 3);
        let calls = d.transport().calls();
        assert_eq!(calls.len(), 3);
        let tokens: Vec<Option<&Value>> = calls.iter().map(|c| c.request.get("page")).collect();
        assert_eq!(tokens, vec![None, Some(&json!("B")), Some(&json!("C"))]);
    }

    #[tokio::test]
    async fn manual_mode_issues_one_request() {
        let d = Dispatcher::new(
            ScriptedTransport::new(ENDPOINT)
                .ok(page(json!([1]), Some("A")))
                .ok(page(json!([2]), None)),
        );
        let inv = invocation("ListVcns", &[("CompartmentId", "c"), ("Page", "START")], PagingMode::Manual);
        let cancel = CancellationToken::new();
        let envelopes: Vec<Envelope> = d.pages(&inv, &cancel).collect().await;
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].raw().unwrap()["opcNextPage"], "A");
        let calls = d.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].request.get("page"), Some(&json!("START")));
    }

    #[tokio::test]
    async fn pagination_stops_on_first_error() {
        let d = Dispatcher::new(
            ScriptedTransport::new(ENDPOINT)
                .ok(page(json!([1]), Some("A")))
                .err(TransportError::Service(ServiceFault {
                    status: 429,
                    code: "TooManyRequests".into(),
                    message: "slow down".into(),
                }))
                .ok(page(json!([3]), None)),
        );
        let inv = invocation("ListInstances", &[("CompartmentId", "c")], PagingMode::Auto);
        let cancel = CancellationToken::new();
        let envelopes: Vec<Envelope> = d.pages(&inv, &cancel).collect().await;
        assert_eq!(envelopes.len(), 2);
        assert!(envelopes[0].is_success());
        assert!(!envelopes[1].is_success());
        assert_eq!(d.transport().calls().len(), 2);
    }

    #[tokio::test]
    async fn unpaged_operation_yields_single_envelope() {
        let d = Dispatcher::new(ScriptedTransport::new(ENDPOINT).ok(json!({"value": "ns"})));
        let inv = invocation("GetNamespace", &[], PagingMode::Auto);
        let cancel = CancellationToken::new();
        let envelopes: Vec<Envelope> = d.pages(&inv, &cancel).collect().await;
        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].selected(), Some(&json!("ns")));
    }

    #[tokio::test]
    async fn name_resolution_failure_names_endpoint() {
        let d = Dispatcher::new(ScriptedTransport::new(ENDPOINT).err(TransportError::Connection {
            message: "dns error: failed to lookup address information".into(),
            cause: Some(ConnectCause::NameResolution {
                host: "iaas.eu-test-1.example.com".into(),
            }),
        }));
        let inv = invocation("GetNamespace", &[], PagingMode::Auto);
        let env = d.invoke(&inv, &CancellationToken::new()).await;
        let err = env.error().unwrap();
        assert_eq!(err.kind(), "connectivity");
        assert!(err.to_string().contains(ENDPOINT));
    }

    #[tokio::test]
    async fn other_failures_pass_through_unmodified() {
        let original = TransportError::Connection {
            message: "connection reset".into(),
            cause: Some(ConnectCause::Other("reset by peer".into())),
        };
        let d = Dispatcher::new(ScriptedTransport::new(ENDPOINT).err(original.clone()));
        let inv = invocation("GetNamespace", &[], PagingMode::Auto);
        let env = d.invoke(&inv, &CancellationToken::new()).await;
        assert_eq!(env.error(), Some(&DispatchError::Transport(original.clone())));
        assert_eq!(env.error().unwrap().to_string(), original.to_string());
    }

    #[tokio::test]
    async fn echo_selector_emits_bound_value() {
        let d = Dispatcher::new(ScriptedTransport::new(ENDPOINT).ok(json!({"opcRequestId": "r"})));
        let inv = bind(
            lookup("DeleteVcn").unwrap(),
            &params(&[("VcnId", "ocid1.vcn.z")]),
            &SelectOptions { select: None, pass_thru: true },
            PagingMode::Auto,
        )
        .unwrap();
        let env = d.invoke(&inv, &CancellationToken::new()).await;
        assert_eq!(env.selected(), Some(&json!("ocid1.vcn.z")));
    }
}
