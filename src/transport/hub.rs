use crate::events::{ActionRequest, ActionResult, FocusNotification, Notification};
use crate::services::{ActionQueue, TargetHandle};
use tokio::sync::broadcast;

/// Typed event channel between connected control surfaces and the core:
/// notifications fan out to every subscriber, actions go through the single
/// action queue and come back as one acknowledgement.
#[derive(Clone)]
pub struct EventHub {
    notifier: broadcast::Sender<Notification>,
    queue: ActionQueue,
    target: TargetHandle,
}

impl EventHub {
    pub fn new(notifier: broadcast::Sender<Notification>, queue: ActionQueue, target: TargetHandle) -> Self {
        Self { notifier, queue, target }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Начальное состояние для только что подключившейся панели
    pub fn greeting(&self) -> Option<Notification> {
        self.target.current_target().map(|app| {
            Notification::WindowFocus(FocusNotification {
                app,
                title: String::new(),
                connected: true,
            })
        })
    }

    pub async fn execute(&self, request: ActionRequest) -> ActionResult {
        self.queue.submit(request).await
    }
}
