use serde::{Deserialize, Serialize};

use crate::types::xyz::XYZ;

/// Remote mode: gimbal follows the phone gyro frames it receives.
pub const MODE_MANUAL: u8 = 0;
/// Remote mode: gimbal runs its own control loop.
pub const MODE_AUTO: u8 = 1;

/// Outbound command frames understood by the gimbal firmware.
///
/// Each value serializes to a single JSON object tagged by `cmd`, which is
/// exactly one text frame on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Command {
    #[serde(rename = "setMode")]
    SetMode { mode: u8 },
    #[serde(rename = "setPhoneGyro")]
    SetPhoneGyro { gx: f64, gy: f64, gz: f64 },
}

impl Command {
    /// Command switching the gimbal to externally-driven control.
    pub fn manual_mode() -> Self {
        Command::SetMode { mode: MODE_MANUAL }
    }

    /// Command returning the gimbal to its own control loop.
    pub fn auto_mode() -> Self {
        Command::SetMode { mode: MODE_AUTO }
    }

    /// Command carrying one gyro reading.
    pub fn phone_gyro(sample: &XYZ) -> Self {
        Command::SetPhoneGyro {
            gx: sample.x(),
            gy: sample.y(),
            gz: sample.z(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
