use serde::{Deserialize, Serialize};
use std::fmt;

/// Снимок активного окна за один тик опроса
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FocusObservation {
    pub app_name: String,
    pub window_title: String,
}

impl FocusObservation {
    pub fn new(app_name: impl Into<String>, window_title: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            window_title: window_title.into(),
        }
    }

    /// Окно самой панели: приложение - один из браузеров, а заголовок
    /// содержит имя продукта или адрес, с которого отдаётся панель.
    /// Все паттерны ожидаются в нижнем регистре.
    pub fn is_control_surface(&self, browser_apps: &[String], self_markers: &[String]) -> bool {
        let app_lower = self.app_name.to_lowercase();
        if !browser_apps.iter().any(|browser| app_lower.contains(browser.as_str())) {
            return false;
        }

        let title_lower = self.window_title.to_lowercase();
        self_markers.iter().any(|marker| title_lower.contains(marker.as_str()))
    }
}

impl fmt::Display for FocusObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.window_title.is_empty() {
            write!(f, "{}", self.app_name)
        } else {
            write!(f, "{} \"{}\"", self.app_name, self.window_title)
        }
    }
}

/// Уведомление о смене фокуса для панели
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusNotification {
    pub app: String,
    pub title: String,
    pub connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMessage {
    pub level: MessageLevel,
    pub message: String,
}

impl SystemMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browsers() -> Vec<String> {
        vec!["chrome".into(), "safari".into(), "firefox".into()]
    }

    fn markers() -> Vec<String> {
        vec!["vibedeck".into(), "localhost:5500".into()]
    }

    #[test]
    fn test_control_surface_needs_browser_and_marker() {
        let deck = FocusObservation::new("Google Chrome", "VibeDeck - Stream Deck");
        assert!(deck.is_control_surface(&browsers(), &markers()));

        let by_address = FocusObservation::new("Safari", "localhost:5500/index.html");
        assert!(by_address.is_control_surface(&browsers(), &markers()));

        let other_tab = FocusObservation::new("Google Chrome", "Rust docs");
        assert!(!other_tab.is_control_surface(&browsers(), &markers()));

        // Заголовок совпадает, но это не браузер
        let editor = FocusObservation::new("Code", "vibedeck/src/main.rs");
        assert!(!editor.is_control_surface(&browsers(), &markers()));
    }

    #[test]
    fn test_system_message_wire_format() {
        let json = serde_json::to_string(&SystemMessage::error("off")).unwrap();
        assert_eq!(json, r#"{"level":"error","message":"off"}"#);
    }
}
