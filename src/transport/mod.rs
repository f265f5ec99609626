//! Transport between control surfaces and the core.
//!
//! `EventHub` is the typed channel the core talks to; `tcp` binds it to
//! newline-delimited JSON over a local TCP socket.

pub mod hub;
pub mod tcp;

pub use hub::EventHub;
pub use tcp::serve;
