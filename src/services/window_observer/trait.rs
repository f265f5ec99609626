use crate::config::BackendKind;
use crate::error::Result;
use crate::events::FocusObservation;
use std::sync::Arc;

/// Trait for sources of the current foreground window
#[async_trait::async_trait]
pub trait WindowObserver: Send + Sync {
    /// Query the OS once for the foreground application and its window title
    async fn current_foreground(&self) -> Result<FocusObservation>;
}

/// Factory function to create an observer for the configured backend
pub fn create_window_observer(kind: BackendKind, dry_run: bool) -> Arc<dyn WindowObserver> {
    if dry_run {
        return Arc::new(super::dry_run::DryRunObserver::new());
    }

    match kind.resolve() {
        BackendKind::AppleScript => Arc::new(super::applescript::AppleScriptObserver::new()),
        BackendKind::Xdotool => Arc::new(super::xdotool::XdotoolObserver::new()),
        BackendKind::DryRun | BackendKind::Auto => Arc::new(super::dry_run::DryRunObserver::new()),
    }
}
