use crate::config::BackendKind;
use crate::error::Result;
use crate::events::Modifiers;
use std::sync::Arc;
use tracing::warn;

/// Синтез клавиатурного ввода в активное приложение
#[async_trait::async_trait]
pub trait KeystrokeSynthesizer: Send + Sync {
    /// Напечатать строку без перевода строки. Строка не содержит `\n`.
    async fn type_text(&self, text: &str) -> Result<()>;

    /// Нажать Return
    async fn press_return(&self) -> Result<()>;

    /// Один аккорд: клавиша плюс набор зажатых модификаторов
    async fn press_chord(&self, key: &str, modifiers: Modifiers) -> Result<()>;
}

/// Factory function to create a synthesizer for the configured backend
pub fn create_synthesizer(kind: BackendKind, dry_run: bool) -> Arc<dyn KeystrokeSynthesizer> {
    if dry_run {
        return Arc::new(super::dry_run::DryRunSynthesizer::new());
    }

    match kind.resolve() {
        BackendKind::AppleScript => {
            if !cfg!(target_os = "macos") {
                warn!("AppleScript бэкенд выбран не на macOS - нажатия работать не будут");
            }
            Arc::new(super::applescript::AppleScriptSynthesizer::new())
        }
        BackendKind::Xdotool => Arc::new(super::xdotool::XdotoolSynthesizer::new()),
        BackendKind::DryRun | BackendKind::Auto => Arc::new(super::dry_run::DryRunSynthesizer::new()),
    }
}
