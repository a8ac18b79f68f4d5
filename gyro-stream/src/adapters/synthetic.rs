// Emulates a real gyroscope for development without hardware: a background
// task refreshes the latest reading with a smooth rotation profile, with
// optional Gaussian noise on every axis.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tokio::sync::Notify;

use common::XYZ;

use crate::ports::GyroDriver;

/// Peak angular rate of the synthetic rotation profile, rad/s.
const PROFILE_AMPLITUDE: f64 = 0.8;
/// Frequency of the synthetic rotation profile, Hz.
const PROFILE_FREQUENCY: f64 = 0.25;

/// Functionality to add some Gaussian noise.
#[derive(Clone)]
struct GaussianNoise {
    normal: Normal<f64>,
}

impl GaussianNoise {
    /// Creates new distribution from mean and stdev
    fn new(mean: f64, stdev: f64) -> Self {
        Self {
            normal: Normal::new(mean, stdev).unwrap(),
        }
    }

    /// Sample from distribution
    fn draw_sample(&self, rng: &mut StdRng) -> f64 {
        self.normal.sample(rng)
    }

    /// Adds independent noise to each axis of a reading
    fn perturb(&self, rng: &mut StdRng, reading: XYZ) -> XYZ {
        let [x, y, z] = reading.inner();
        XYZ::new([
            x + self.draw_sample(rng),
            y + self.draw_sample(rng),
            z + self.draw_sample(rng),
        ])
    }
}

/// Smooth rotation profile: slow sinusoids out of phase across the axes.
fn rotation_profile(elapsed_secs: f64) -> XYZ {
    let phase = 2.0 * std::f64::consts::PI * PROFILE_FREQUENCY * elapsed_secs;
    XYZ::new([
        PROFILE_AMPLITUDE * phase.sin(),
        PROFILE_AMPLITUDE * (phase + 2.0 * std::f64::consts::FRAC_PI_3).sin(),
        PROFILE_AMPLITUDE * (phase + 4.0 * std::f64::consts::FRAC_PI_3).sin(),
    ])
}

/// Synthetic gyroscope driver.
pub struct SyntheticGyro {
    available: bool,
    noise: Option<GaussianNoise>,
    latest: Arc<Mutex<Option<XYZ>>>,
    update_abort: Mutex<Option<Arc<Notify>>>,
}

impl SyntheticGyro {
    /// Noise-free synthetic gyroscope.
    pub fn new() -> Self {
        Self {
            available: true,
            noise: None,
            latest: Arc::new(Mutex::new(None)),
            update_abort: Mutex::new(None),
        }
    }

    /// Synthetic gyroscope with Gaussian noise of the given stdev (rad/s) on
    /// every axis.
    pub fn with_noise(stdev: f64) -> Self {
        Self {
            noise: Some(GaussianNoise::new(0.0, stdev)),
            ..Self::new()
        }
    }

    /// Driver that reports no sensor, for exercising the unavailable path.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }
}

impl Default for SyntheticGyro {
    fn default() -> Self {
        Self::new()
    }
}

impl GyroDriver for SyntheticGyro {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start_updates(&self, period: Duration) {
        if !self.available {
            return;
        }
        let mut update_abort = self.update_abort.lock().unwrap();
        if update_abort.is_some() {
            return;
        }

        let abort_signal = Arc::new(Notify::new());
        *update_abort = Some(Arc::clone(&abort_signal));

        let latest = Arc::clone(&self.latest);
        let noise = self.noise.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            let mut rng = StdRng::from_entropy();
            loop {
                tokio::select! {
                    _ = abort_signal.notified() => {
                        break;
                    }
                    _ = tokio::time::sleep(period) => {
                        let mut reading = rotation_profile(started.elapsed().as_secs_f64());
                        if let Some(noise) = noise.as_ref() {
                            reading = noise.perturb(&mut rng, reading);
                        }
                        *latest.lock().unwrap() = Some(reading);
                    }
                }
            }
        });
    }

    fn stop_updates(&self) {
        if let Some(abort_signal) = self.update_abort.lock().unwrap().take() {
            abort_signal.notify_one();
        }
        *self.latest.lock().unwrap() = None;
    }

    fn latest(&self) -> Option<XYZ> {
        self.latest.lock().unwrap().clone()
    }
}
