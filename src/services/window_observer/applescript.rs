use super::r#trait::WindowObserver;
use crate::bridge_error;
use crate::error::{BridgeError, Result};
use crate::events::FocusObservation;
use crate::utils::process::run_tool;

const FRONT_WINDOW_SCRIPT: &str = r#"tell application "System Events"
    set frontApp to first application process whose frontmost is true
    set appName to name of frontApp
    set winTitle to ""
    try
        set winTitle to name of front window of frontApp
    end try
end tell
return appName & linefeed & winTitle"#;

/// Активное окно через System Events. Требует разрешения Accessibility
/// для терминала, из которого запущен сервер.
pub struct AppleScriptObserver;

impl AppleScriptObserver {
    pub fn new() -> Self {
        Self
    }
}

/// Вывод скрипта: имя приложения в первой строке, заголовок окна во второй
pub fn parse_front_window(stdout: &str) -> Result<FocusObservation> {
    let stdout = stdout.trim_end_matches(['\n', '\r']);
    let (app, title) = stdout.split_once('\n').unwrap_or((stdout, ""));
    let app = app.trim();

    if app.is_empty() {
        return Err(bridge_error!(observation, "System Events не вернул активное приложение"));
    }

    Ok(FocusObservation::new(app, title.trim()))
}

#[async_trait::async_trait]
impl WindowObserver for AppleScriptObserver {
    async fn current_foreground(&self) -> Result<FocusObservation> {
        let output = run_tool("osascript", &["-e", FRONT_WINDOW_SCRIPT])
            .await
            .map_err(|e| BridgeError::Observation(e.to_string()))?;

        if let Some(diagnostic) = output.diagnostic() {
            return Err(BridgeError::Observation(diagnostic));
        }

        parse_front_window(&output.stdout)
    }
}
