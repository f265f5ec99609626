//! Keystroke synthesis: responsibility and boundaries
//!
//! Backends here only turn "type this line", "press return" and "press this
//! chord" into host input. Line splitting, validation and dispatch by action
//! type live in ActionExecutor, so they stay platform independent.

mod applescript;
mod dry_run;
mod escape;
mod xdotool;
mod r#trait;

#[cfg(test)]
pub use self::dry_run::{DryRunSynthesizer, SynthCall};
pub use self::r#trait::{create_synthesizer, KeystrokeSynthesizer};
