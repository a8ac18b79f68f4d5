//! Shared functionality for the `gimbal-stream` workspace

#[doc(hidden)]
pub mod traits;
#[doc(hidden)]
pub mod types;

// Re-export traits
#[doc(inline)]
pub use traits::CommandSink;

// Re-export types
#[doc(inline)]
pub use types::{Command, ConnectionState, MODE_AUTO, MODE_MANUAL, XYZ};
