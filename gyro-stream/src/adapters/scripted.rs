// Deterministic driver for tests: serves a scripted sequence of readings,
// one entry per `latest` call. `None` entries model ticks where the hardware
// has not produced a reading.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use common::XYZ;

use crate::ports::GyroDriver;

pub struct ScriptedGyro {
    available: bool,
    script: Mutex<VecDeque<Option<XYZ>>>,
    update_period: Mutex<Option<Duration>>,
}

impl ScriptedGyro {
    pub fn new(script: Vec<Option<XYZ>>) -> Self {
        Self {
            available: true,
            script: Mutex::new(script.into()),
            update_period: Mutex::new(None),
        }
    }

    /// Driver that reports no sensor, for exercising the unavailable path.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            script: Mutex::new(VecDeque::new()),
            update_period: Mutex::new(None),
        }
    }

    /// The update period the streamer configured, if updates were started.
    pub fn configured_update_period(&self) -> Option<Duration> {
        *self.update_period.lock().unwrap()
    }

    /// Script entries not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

impl GyroDriver for ScriptedGyro {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start_updates(&self, period: Duration) {
        *self.update_period.lock().unwrap() = Some(period);
    }

    fn stop_updates(&self) {
        *self.update_period.lock().unwrap() = None;
    }

    fn latest(&self) -> Option<XYZ> {
        self.script.lock().unwrap().pop_front().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_is_served_in_order() {
        let driver = ScriptedGyro::new(vec![
            Some(XYZ::new([1.0, 2.0, 3.0])),
            None,
            Some(XYZ::new([4.0, 5.0, 6.0])),
        ]);

        assert_eq!(driver.latest(), Some(XYZ::new([1.0, 2.0, 3.0])));
        assert_eq!(driver.latest(), None);
        assert_eq!(driver.latest(), Some(XYZ::new([4.0, 5.0, 6.0])));
        assert_eq!(driver.latest(), None);
        assert_eq!(driver.remaining(), 0);
    }

    #[test]
    fn test_update_period_is_recorded() {
        let driver = ScriptedGyro::new(vec![]);
        assert_eq!(driver.configured_update_period(), None);

        driver.start_updates(Duration::from_millis(45));
        assert_eq!(
            driver.configured_update_period(),
            Some(Duration::from_millis(45))
        );

        driver.stop_updates();
        assert_eq!(driver.configured_update_period(), None);
    }
}
