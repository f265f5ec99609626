pub mod action_executor;
pub mod action_queue;
pub mod focus_tracker;
pub mod keycode_map;
pub mod keystroke;
pub mod window_observer;

pub use action_executor::ActionExecutor;
pub use action_queue::ActionQueue;
pub use focus_tracker::{FocusSettings, FocusTracker, TargetHandle};
pub use keystroke::create_synthesizer;
pub use window_observer::create_window_observer;
