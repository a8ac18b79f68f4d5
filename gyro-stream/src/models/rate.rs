use std::fmt;
use std::time::Duration;

use crate::constants::DRIVER_UPDATE_FACTOR;
use crate::models::errors::StreamError;

/// Supported output cadences for gyro streaming.
///
/// The set mirrors the rates the device UI offers; anything else is a
/// caller/configuration concern and is rejected at conversion time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamRate {
    Hz10,
    Hz20,
    Hz50,
}

impl StreamRate {
    pub fn hz(&self) -> u32 {
        match self {
            StreamRate::Hz10 => 10,
            StreamRate::Hz20 => 20,
            StreamRate::Hz50 => 50,
        }
    }

    /// Interval between outbound samples.
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.hz()))
    }

    /// Interval at which the hardware driver refreshes its reading, slightly
    /// faster than the output cadence so ticks never see stale data.
    pub fn update_period(&self) -> Duration {
        Duration::from_secs_f64(DRIVER_UPDATE_FACTOR / f64::from(self.hz()))
    }
}

impl TryFrom<u32> for StreamRate {
    type Error = StreamError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(StreamRate::Hz10),
            20 => Ok(StreamRate::Hz20),
            50 => Ok(StreamRate::Hz50),
            other => Err(StreamError::UnsupportedRate(other)),
        }
    }
}

impl fmt::Display for StreamRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz", self.hz())
    }
}
