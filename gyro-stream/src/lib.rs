//! # Crate gyro_stream
//!
//! ## gyro-stream
//!
//! The `gyro_stream` crate samples a gyroscope at a fixed cadence and
//! forwards each reading, encoded as a command frame, to a bound transport.
//! It is the sampling half of the phone-to-gimbal pipeline: a transport
//! client (for instance `gimbal_link`) owns the connection, while this crate
//! owns the periodic tick that turns hardware readings into outbound
//! `setPhoneGyro` frames.
//!
//! Features include:
//! - Selection of the output rate from the supported set (10/20/50 Hz); the
//!   hardware driver is configured slightly faster so every tick sees a
//!   fresh reading.
//! - A `GyroDriver` port for the hardware seam, with a synthetic adapter for
//!   running without real hardware and a scripted adapter for deterministic
//!   tests.
//! - Ticks with no reading available are skipped outright: no frame goes
//!   out and the dispatched-sample counter does not move.
//! - Observability: dispatched-sample counter, last dispatched reading, and
//!   registration of listeners notified on every dispatched sample.

pub(crate) mod adapters;
pub(crate) mod constants;
pub(crate) mod models;
pub mod ports;
pub mod services;

pub use adapters::{ScriptedGyro, SyntheticGyro};
pub use models::errors::StreamError;
pub use models::rate::StreamRate;
pub use ports::GyroDriver;
pub use services::GyroStreamService;
