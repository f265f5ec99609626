use super::r#trait::WindowObserver;
use crate::error::{BridgeError, Result};
use crate::events::FocusObservation;
use crate::utils::process::run_tool;
use tracing::debug;

/// Активное окно через xdotool: класс окна служит именем приложения
pub struct XdotoolObserver;

impl XdotoolObserver {
    pub fn new() -> Self {
        Self
    }

    async fn query(&self, what: &str) -> Result<String> {
        let output = run_tool("xdotool", &["getactivewindow", what])
            .await
            .map_err(|e| BridgeError::Observation(e.to_string()))?;

        if let Some(diagnostic) = output.diagnostic() {
            debug!("xdotool {} вернул ошибку: {}", what, diagnostic);
            return Err(BridgeError::Observation(format!("xdotool {}: {}", what, diagnostic)));
        }

        Ok(output.stdout.trim().to_string())
    }
}

#[async_trait::async_trait]
impl WindowObserver for XdotoolObserver {
    async fn current_foreground(&self) -> Result<FocusObservation> {
        let title = self.query("getwindowname").await?;
        let class = self.query("getwindowclassname").await?;
        debug!("xdotool получил окно: класс '{}', заголовок '{}'", class, title);

        if class.is_empty() {
            return Err(BridgeError::Observation("xdotool вернул пустой класс окна".to_string()));
        }

        Ok(FocusObservation::new(class, title))
    }
}
