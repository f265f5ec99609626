pub mod action;
pub mod focus;

pub use action::{Action, ActionRequest, ActionResult, Modifiers};
pub use focus::{FocusNotification, FocusObservation, SystemMessage};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

/// Все уведомления, которые сервер рассылает подключённым панелям
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum Notification {
    #[serde(rename = "window:focus")]
    WindowFocus(FocusNotification),
    #[serde(rename = "system:message")]
    System(SystemMessage),
    #[serde(rename = "action:success")]
    ActionSucceeded { action: ActionRequest },
    #[serde(rename = "action:error")]
    ActionFailed { action: ActionRequest, error: String },
    #[serde(rename = "model:changed")]
    ModelChanged { model: String },
}

impl Notification {
    /// Разослать всем подписчикам; без подписчиков событие просто теряется
    pub fn publish(self, notifier: &broadcast::Sender<Notification>) {
        if notifier.send(self).is_err() {
            debug!("Нет подписчиков на уведомления, событие отброшено");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_wire_format() {
        let focus = Notification::WindowFocus(FocusNotification {
            app: "Terminal".into(),
            title: "zsh".into(),
            connected: true,
        });
        assert_eq!(
            serde_json::to_string(&focus).unwrap(),
            r#"{"event":"window:focus","data":{"app":"Terminal","title":"zsh","connected":true}}"#
        );

        let model = Notification::ModelChanged { model: "opus".into() };
        assert_eq!(
            serde_json::to_string(&model).unwrap(),
            r#"{"event":"model:changed","data":{"model":"opus"}}"#
        );
    }

    #[test]
    fn test_publish_with_and_without_subscribers() {
        let (tx, rx) = broadcast::channel(4);
        drop(rx);
        Notification::ModelChanged { model: "lost".into() }.publish(&tx);

        let mut rx = tx.subscribe();
        Notification::ModelChanged { model: "opus".into() }.publish(&tx);
        assert_eq!(rx.try_recv().unwrap(), Notification::ModelChanged { model: "opus".into() });
        assert!(rx.try_recv().is_err());
    }
}
