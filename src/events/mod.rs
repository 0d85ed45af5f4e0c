// ─── Event Intake ───
// Receives the backend's free-text log/status lines for the lifetime of a
// session and hands them to observers in arrival order.

use tokio::sync::mpsc;
use tracing::debug;

use crate::backend::{Backend, EventLine};

/// Owning handle for the single long-lived event subscription.
///
/// Established once at session construction, independent of launch state:
/// lines may arrive before `ACTIVE` and after `IDLE` and are never filtered
/// here. Lines queue unbounded in arrival order (operator-log volume, not
/// data-plane volume). Teardown happens at most once; closing an already
/// closed intake is a no-op, and dropping the handle closes it.
pub struct EventIntake {
    rx: Option<mpsc::UnboundedReceiver<EventLine>>,
}

impl EventIntake {
    pub fn subscribe(backend: &dyn Backend) -> Self {
        Self {
            rx: Some(backend.subscribe_events()),
        }
    }

    /// Next line in backend emission order. Returns `None` once the
    /// subscription is closed (locally or by the backend) and drained.
    pub async fn recv(&mut self) -> Option<EventLine> {
        self.rx.as_mut()?.recv().await
    }

    /// Non-blocking variant for poll-driven consumers.
    pub fn try_recv(&mut self) -> Option<EventLine> {
        self.rx.as_mut()?.try_recv().ok()
    }

    pub fn is_open(&self) -> bool {
        self.rx.is_some()
    }

    /// Tear down the subscription. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.rx.take().is_some() {
            debug!("Event intake closed");
        }
    }
}
