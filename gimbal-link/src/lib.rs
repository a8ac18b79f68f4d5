//! # Crate gimbal_link
//!
//! ## gimbal-link
//!
//! The `gimbal_link` crate owns the persistent WebSocket connection between a
//! handheld device and a gimbal controller. It provides fire-and-forget text
//! dispatch plus the small mode-select handshake the gimbal firmware expects:
//! shortly after connecting the gimbal is switched to externally-driven
//! ("manual") mode, and on disconnect it is handed back to its own control
//! loop ("auto" mode) before the socket closes.
//!
//! Features include:
//! - Single outbound connection with a `Disconnected` / `Connecting` /
//!   `Connected` state machine; `connect` is a no-op unless disconnected.
//! - Fire-and-forget dispatch: frames sent while the link is closed are
//!   silently dropped, transport failures surface through the last-error
//!   observable instead of breaking the connection.
//! - Passive receive loop that drains inbound frames without interpreting
//!   them; a receive failure is recorded and the loop is not re-armed.
//! - Registration of listeners for connection-state changes and errors.
//!
//! All failures are local: nothing in this crate aborts the process, and the
//! caller decides whether to retry by issuing a fresh `connect`.

mod client;
pub(crate) mod constants;
pub mod helpers;
pub(crate) mod models;

pub use client::GimbalLink;
pub use models::errors::LinkError;
