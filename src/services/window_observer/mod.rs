//! WindowObserver: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for asking the OS which
//! application and window currently have focus. Change suppression, the
//! control-surface filter and the sticky target all belong to FocusTracker.

mod applescript;
mod dry_run;
mod xdotool;
mod r#trait;

#[cfg(test)]
pub use self::dry_run::DryRunObserver;
pub use self::r#trait::{create_window_observer, WindowObserver};
