use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::event::ProxyEvent;
use crate::intercept::InterceptDecision;

/// Bounded on purpose: a stalled or absent consumer must never wedge a
/// connection task, so producers use try_send and shed on saturation.
const EVENT_CHANNEL_CAPACITY: usize = 4096;
const CONTROL_CHANNEL_CAPACITY: usize = 256;

pub type ProxyEvents = ReceiverStream<ProxyEvent>;

pub fn event_channel() -> (mpsc::Sender<ProxyEvent>, ProxyEvents) {
    let (sender, receiver) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    (sender, ReceiverStream::new(receiver))
}

#[derive(Debug)]
pub enum ProxyCommand {
    SetInterceptEnabled(bool),
    ResolveIntercept {
        id: Uuid,
        decision: InterceptDecision,
    },
}

/// Operator-side handle for toggling interception and resolving paused
/// requests. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ProxyControl {
    sender: mpsc::Sender<ProxyCommand>,
}

impl ProxyControl {
    pub async fn set_intercept_enabled(&self, enabled: bool) -> bool {
        self.sender
            .send(ProxyCommand::SetInterceptEnabled(enabled))
            .await
            .is_ok()
    }

    pub async fn resolve_intercept(&self, id: Uuid, decision: InterceptDecision) -> bool {
        self.sender
            .send(ProxyCommand::ResolveIntercept { id, decision })
            .await
            .is_ok()
    }
}

pub fn control_channel() -> (ProxyControl, mpsc::Receiver<ProxyCommand>) {
    let (sender, receiver) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
    (ProxyControl { sender }, receiver)
}
