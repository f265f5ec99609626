use crate::error::ActionError;
use crate::events::{Action, ActionRequest, ActionResult};
use crate::services::keystroke::KeystrokeSynthesizer;
use std::sync::Arc;
use tracing::{info, warn};

/// Превращает одно действие панели в клавиатурный ввод.
///
/// Состояния между вызовами нет: один запрос - один результат. Первая же
/// ошибка синтеза прерывает действие, оставшиеся шаги не выполняются.
pub struct ActionExecutor {
    synthesizer: Arc<dyn KeystrokeSynthesizer>,
}

impl ActionExecutor {
    pub fn new(synthesizer: Arc<dyn KeystrokeSynthesizer>) -> Self {
        Self { synthesizer }
    }

    pub async fn execute(&self, request: &ActionRequest) -> ActionResult {
        let result = match request.validate() {
            Ok(action) => {
                info!("Выполнение действия: {}", action);
                self.run(&action).await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            warn!("Действие '{}' не выполнено: {}", request.kind, e);
        }

        result.into()
    }

    async fn run(&self, action: &Action) -> Result<(), ActionError> {
        match action {
            Action::Model { model } => self.type_lines(&format!("/model {}\n", model)).await,
            Action::Slash { command } => self.type_lines(&format!("{}\n", command)).await,
            Action::Keystroke { text } => self.type_lines(text).await,
            Action::Combo { key, modifiers } => {
                self.synthesizer.press_chord(key, *modifiers).await?;
                Ok(())
            }
            Action::Permission { response } => self.type_lines(&format!("{}\n", response)).await,
        }
    }

    /// Многострочный ввод: каждая строка печатается отдельно, между строками
    /// нажимается Return. Завершающий `\n` даёт ровно один Return после
    /// последней строки, пустые строки дают только Return.
    async fn type_lines(&self, text: &str) -> Result<(), ActionError> {
        let ends_with_newline = text.ends_with('\n');
        let lines: Vec<&str> = text.split_terminator('\n').collect();
        let last = lines.len().saturating_sub(1);

        for (i, line) in lines.iter().enumerate() {
            if !line.is_empty() {
                self.synthesizer.type_text(line).await?;
            }
            if i < last || ends_with_newline {
                self.synthesizer.press_return().await?;
            }
        }

        Ok(())
    }
}
