use std::collections::HashMap;

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::event::{ProxyRequest, SyntheticResponse};

/// Operator resolution for one paused request.
#[derive(Debug, PartialEq, Eq)]
pub enum InterceptDecision {
    /// Release the (possibly edited) request; an attached synthetic
    /// response short-circuits the forward entirely.
    Allow {
        request: ProxyRequest,
        response: Option<SyntheticResponse>,
    },
    Drop,
}

#[derive(Debug)]
pub enum InterceptOutcome {
    /// Gate disabled: proceed immediately.
    Forward(ProxyRequest),
    /// Registered as pending; the receiver resolves exactly once.
    Paused {
        receiver: oneshot::Receiver<InterceptDecision>,
    },
}

#[derive(Debug)]
struct Pending {
    request: ProxyRequest,
    sender: oneshot::Sender<InterceptDecision>,
}

/// The pause gate. At most one pending item per request id; an item is
/// removed before its resolution is delivered, so delivery happens exactly
/// once. Held behind the proxy's mutex.
#[derive(Debug, Default)]
pub struct InterceptGate {
    enabled: bool,
    pending: HashMap<Uuid, Pending>,
}

impl InterceptGate {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling flushes every waiter with its original request so nothing
    /// stays blocked after the operator turns interception off.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled && self.enabled {
            for (_, pending) in std::mem::take(&mut self.pending) {
                let _ = pending.sender.send(InterceptDecision::Allow {
                    request: pending.request,
                    response: None,
                });
            }
        }
        self.enabled = enabled;
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn intercept(&mut self, request: ProxyRequest) -> InterceptOutcome {
        if !self.enabled {
            return InterceptOutcome::Forward(request);
        }

        let (sender, receiver) = oneshot::channel();
        self.pending
            .insert(request.id, Pending { request, sender });

        InterceptOutcome::Paused { receiver }
    }

    /// Resolves a pending item. A stale or duplicate id is a silent no-op:
    /// late operator callbacks must never disturb the forwarding path.
    pub fn resolve(&mut self, id: Uuid, decision: InterceptDecision) -> bool {
        let Some(pending) = self.pending.remove(&id) else {
            return false;
        };

        let decision = match decision {
            InterceptDecision::Allow {
                mut request,
                response,
            } => {
                // The operator may have edited the routing target away;
                // restore it from the original paused request.
                request.scheme = pending.request.scheme.clone();
                request.host = pending.request.host.clone();
                request.port = pending.request.port;
                InterceptDecision::Allow { request, response }
            }
            InterceptDecision::Drop => InterceptDecision::Drop,
        };

        let _ = pending.sender.send(decision);
        true
    }

    /// Releases one pending item with its original request, used when the
    /// announcement sink is unavailable.
    pub fn release(&mut self, id: Uuid) -> bool {
        let Some(pending) = self.pending.remove(&id) else {
            return false;
        };
        let _ = pending.sender.send(InterceptDecision::Allow {
            request: pending.request,
            response: None,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{InterceptDecision, InterceptGate, InterceptOutcome};
    use crate::event::{ProxyRequest, SyntheticResponse};
    use uuid::Uuid;

    fn request(path: &str) -> ProxyRequest {
        ProxyRequest {
            id: Uuid::new_v4(),
            scheme: "https".to_string(),
            host: "api.acme.com".to_string(),
            port: 443,
            method: "GET".to_string(),
            path: path.to_string(),
            query: None,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    #[tokio::test]
    async fn disabled_gate_forwards_immediately() {
        let mut gate = InterceptGate::default();
        let outcome = gate.intercept(request("/index.html"));
        assert!(matches!(outcome, InterceptOutcome::Forward(_)));
        assert_eq!(gate.pending_len(), 0);
    }

    #[tokio::test]
    async fn resolution_unblocks_exactly_one_waiter() {
        let mut gate = InterceptGate::default();
        gate.set_enabled(true);

        let paused = request("/one");
        let id = paused.id;
        let InterceptOutcome::Paused { receiver } = gate.intercept(paused) else {
            panic!("expected paused request");
        };

        let mut edited = request("/one-edited");
        edited.id = id;
        assert!(gate.resolve(
            id,
            InterceptDecision::Allow {
                request: edited,
                response: None,
            },
        ));

        let decision = receiver.await.expect("decision");
        let InterceptDecision::Allow { request, response } = decision else {
            panic!("expected allow");
        };
        assert_eq!(request.path, "/one-edited");
        assert!(response.is_none());

        // A second callback for the same id is a no-op.
        assert!(!gate.resolve(
            id,
            InterceptDecision::Allow {
                request: request.clone(),
                response: None,
            },
        ));
    }

    #[tokio::test]
    async fn stale_callback_is_ignored() {
        let mut gate = InterceptGate::default();
        gate.set_enabled(true);
        assert!(!gate.resolve(
            Uuid::new_v4(),
            InterceptDecision::Allow {
                request: request("/nope"),
                response: None,
            },
        ));
    }

    #[tokio::test]
    async fn allow_restores_original_routing_target() {
        let mut gate = InterceptGate::default();
        gate.set_enabled(true);

        let paused = request("/login");
        let id = paused.id;
        let InterceptOutcome::Paused { receiver } = gate.intercept(paused) else {
            panic!("expected paused request");
        };

        let mut edited = request("/login");
        edited.id = id;
        edited.scheme = "http".to_string();
        edited.host = "evil.example".to_string();
        edited.port = 80;
        gate.resolve(
            id,
            InterceptDecision::Allow {
                request: edited,
                response: None,
            },
        );

        let InterceptDecision::Allow { request, .. } = receiver.await.expect("decision") else {
            panic!("expected allow");
        };
        assert_eq!(request.scheme, "https");
        assert_eq!(request.host, "api.acme.com");
        assert_eq!(request.port, 443);
    }

    #[tokio::test]
    async fn disabling_flushes_all_waiters_with_originals() {
        let mut gate = InterceptGate::default();
        gate.set_enabled(true);

        let mut receivers = Vec::new();
        for index in 0..3 {
            let paused = request(&format!("/pending/{index}"));
            let InterceptOutcome::Paused { receiver } = gate.intercept(paused) else {
                panic!("expected paused request");
            };
            receivers.push(receiver);
        }
        assert_eq!(gate.pending_len(), 3);

        gate.set_enabled(false);
        assert_eq!(gate.pending_len(), 0);

        for receiver in receivers {
            let decision = receiver.await.expect("flushed decision");
            let InterceptDecision::Allow { request, response } = decision else {
                panic!("expected allow");
            };
            assert!(request.path.starts_with("/pending/"));
            assert!(response.is_none());
        }
    }

    #[tokio::test]
    async fn synthetic_response_travels_with_the_decision() {
        let mut gate = InterceptGate::default();
        gate.set_enabled(true);

        let paused = request("/blocked");
        let id = paused.id;
        let original = paused.clone();
        let InterceptOutcome::Paused { receiver } = gate.intercept(paused) else {
            panic!("expected paused request");
        };

        gate.resolve(
            id,
            InterceptDecision::Allow {
                request: original,
                response: Some(SyntheticResponse {
                    status_code: 403,
                    reason: "Forbidden".to_string(),
                    headers: Vec::new(),
                    body: b"dropped by operator".to_vec(),
                }),
            },
        );

        let InterceptDecision::Allow { response, .. } = receiver.await.expect("decision") else {
            panic!("expected allow");
        };
        assert_eq!(response.expect("synthetic").status_code, 403);
    }

    #[tokio::test]
    async fn release_delivers_original_without_response() {
        let mut gate = InterceptGate::default();
        gate.set_enabled(true);

        let paused = request("/orphan");
        let id = paused.id;
        let InterceptOutcome::Paused { receiver } = gate.intercept(paused) else {
            panic!("expected paused request");
        };

        assert!(gate.release(id));
        assert!(!gate.release(id));

        let InterceptDecision::Allow { request, response } = receiver.await.expect("decision")
        else {
            panic!("expected allow");
        };
        assert_eq!(request.path, "/orphan");
        assert!(response.is_none());
    }
}
