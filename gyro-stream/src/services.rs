use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, error, info, warn};
use tokio::sync::Notify;
use uuid::Uuid;

use common::{Command, CommandSink, XYZ};
use publisher::{Publisher, PublisherError};

use crate::models::errors::StreamError;
use crate::models::rate::StreamRate;
use crate::ports::GyroDriver;

/// One active streaming run. Holds the abort handle for its tick task; the
/// bound sink lives inside the task and is released when the task exits.
struct StreamSession {
    rate: StreamRate,
    abort_signal: Arc<Notify>,
}

/// Periodic gyro sampler bound to a command sink.
///
/// Reads the freshest reading from the hardware driver once per tick,
/// encodes it as a `setPhoneGyro` frame and hands it to the sink,
/// fire-and-forget. The dispatched-sample counter and the retained last
/// sample only move when a tick actually dispatched a frame.
pub struct GyroStreamService<D>
where
    D: GyroDriver,
{
    driver: Arc<D>,
    session: Mutex<Option<StreamSession>>,
    packet_count: Arc<AtomicU64>,
    last_sample: Arc<Mutex<Option<XYZ>>>,
    sample_events: Publisher<XYZ>,
}

impl<D> GyroStreamService<D>
where
    D: GyroDriver,
{
    /// Creates a streamer over the given hardware driver.
    pub fn new(driver: D) -> Self {
        Self {
            driver: Arc::new(driver),
            session: Mutex::new(None),
            packet_count: Arc::new(AtomicU64::new(0)),
            last_sample: Arc::new(Mutex::new(None)),
            sample_events: Publisher::new(),
        }
    }

    /// Starts streaming readings to `sink` at the given output rate.
    ///
    /// The driver is configured to refresh slightly faster than the output
    /// cadence, and the dispatched-sample counter restarts from zero. If the
    /// hardware reports unavailable this is a no-op: a diagnostic is logged
    /// and no timer starts. Also a no-op while a session is already active;
    /// there is at most one session per service.
    ///
    /// The sink is borrowed for the lifetime of the session only; the
    /// streamer never opens or closes the transport behind it. Callers
    /// should not start streaming before the transport is fully open.
    pub fn start_streaming(&self, rate: StreamRate, sink: Arc<dyn CommandSink>) {
        let mut session = self.session.lock().unwrap();
        if session.is_some() {
            debug!("start ignored, streaming is already active");
            return;
        }
        if !self.driver.is_available() {
            warn!("gyroscope not available, streaming not started");
            return;
        }

        self.packet_count.store(0, Ordering::SeqCst);
        self.driver.start_updates(rate.update_period());

        let abort_signal = Arc::new(Notify::new());
        *session = Some(StreamSession {
            rate,
            abort_signal: Arc::clone(&abort_signal),
        });
        drop(session);

        info!("streaming gyro samples at {}", rate);

        let driver = Arc::clone(&self.driver);
        let packet_count = Arc::clone(&self.packet_count);
        let last_sample = Arc::clone(&self.last_sample);
        let sample_events = self.sample_events.clone();
        tokio::spawn(async move {
            let period = rate.period();
            loop {
                tokio::select! {
                    _ = abort_signal.notified() => {
                        break;
                    }
                    _ = tokio::time::sleep(period) => {
                        dispatch_tick(
                            driver.as_ref(),
                            sink.as_ref(),
                            &packet_count,
                            &last_sample,
                            &sample_events,
                        );
                    }
                }
            }
        });
    }

    /// Stops the periodic tick and hardware sampling and releases the bound
    /// sink. Idempotent: calling while not streaming has no effect.
    pub fn stop_streaming(&self) {
        let mut session = self.session.lock().unwrap();
        match session.take() {
            Some(active) => {
                active.abort_signal.notify_one();
                self.driver.stop_updates();
                info!("streaming at {} stopped", active.rate);
            }
            None => debug!("stop ignored, no active stream"),
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.session.lock().unwrap().is_some()
    }

    /// Output rate of the active session, if any.
    pub fn rate(&self) -> Option<StreamRate> {
        self.session.lock().unwrap().as_ref().map(|s| s.rate)
    }

    /// Number of samples dispatched since streaming started.
    pub fn packet_count(&self) -> u64 {
        self.packet_count.load(Ordering::SeqCst)
    }

    /// Most recent reading that was actually dispatched.
    pub fn last_sample(&self) -> Option<XYZ> {
        self.last_sample.lock().unwrap().clone()
    }

    /// Registers a listener notified with every dispatched reading.
    pub fn register_sample_listener<F>(&self, listener: F) -> Uuid
    where
        F: Fn(Arc<XYZ>) + Send + Sync + 'static,
    {
        self.sample_events.register(listener)
    }

    pub fn unregister_sample_listener(&self, id: Uuid) -> Result<(), PublisherError> {
        self.sample_events.unregister(id)
    }
}

/// Encodes one reading as a `setPhoneGyro` frame.
pub(crate) fn encode_sample(sample: &XYZ) -> Result<String, StreamError> {
    Command::phone_gyro(sample)
        .to_json()
        .map_err(|e| StreamError::Serialization(e.to_string()))
}

/// One tick of the sampling loop: read, encode, dispatch, count.
///
/// A tick with no reading is skipped outright. An encode failure drops the
/// tick with a diagnostic. The counter moves only after the frame was handed
/// to the sink.
fn dispatch_tick(
    driver: &dyn GyroDriver,
    sink: &dyn CommandSink,
    packet_count: &AtomicU64,
    last_sample: &Mutex<Option<XYZ>>,
    sample_events: &Publisher<XYZ>,
) {
    let sample = match driver.latest() {
        Some(sample) => sample,
        // the driver has not produced a reading yet
        None => return,
    };

    let frame = match encode_sample(&sample) {
        Ok(frame) => frame,
        Err(e) => {
            error!("dropping tick, could not encode reading: {:?}", e);
            return;
        }
    };

    sink.send_message(&frame);
    *last_sample.lock().unwrap() = Some(sample.clone());
    packet_count.fetch_add(1, Ordering::SeqCst);
    sample_events.notify(Arc::new(sample));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ScriptedGyro, SyntheticGyro};

    #[derive(Default)]
    struct RecordingSink {
        frames: Mutex<Vec<String>>,
    }

    impl RecordingSink {
        fn frames(&self) -> Vec<String> {
            self.frames.lock().unwrap().clone()
        }
    }

    impl CommandSink for RecordingSink {
        fn send_message(&self, text: &str) {
            self.frames.lock().unwrap().push(text.to_string());
        }
    }

    fn service_with_script(script: Vec<Option<XYZ>>) -> GyroStreamService<ScriptedGyro> {
        GyroStreamService::new(ScriptedGyro::new(script))
    }

    #[test]
    fn test_dispatch_tick_sends_counts_and_retains() {
        let service = service_with_script(vec![Some(XYZ::new([1.0, 2.0, 3.0]))]);
        let sink = RecordingSink::default();

        dispatch_tick(
            service.driver.as_ref(),
            &sink,
            &service.packet_count,
            &service.last_sample,
            &service.sample_events,
        );

        assert_eq!(service.packet_count(), 1);
        assert_eq!(service.last_sample(), Some(XYZ::new([1.0, 2.0, 3.0])));
        assert_eq!(
            sink.frames(),
            vec![r#"{"cmd":"setPhoneGyro","gx":1.0,"gy":2.0,"gz":3.0}"#.to_string()]
        );
    }

    #[test]
    fn test_dispatch_tick_skips_when_no_reading() {
        let service = service_with_script(vec![None]);
        let sink = RecordingSink::default();

        dispatch_tick(
            service.driver.as_ref(),
            &sink,
            &service.packet_count,
            &service.last_sample,
            &service.sample_events,
        );

        assert_eq!(service.packet_count(), 0);
        assert_eq!(service.last_sample(), None);
        assert!(sink.frames().is_empty());
    }

    #[test]
    fn test_encode_sample_round_trips() {
        let frame = encode_sample(&XYZ::new([-1.5, 0.25, 4.0])).unwrap();
        let parsed: Command = serde_json::from_str(&frame).unwrap();
        assert_eq!(
            parsed,
            Command::SetPhoneGyro {
                gx: -1.5,
                gy: 0.25,
                gz: 4.0
            }
        );
    }

    #[tokio::test]
    async fn test_start_is_noop_when_driver_unavailable() {
        let service = GyroStreamService::new(ScriptedGyro::unavailable());
        let sink = Arc::new(RecordingSink::default());

        service.start_streaming(StreamRate::Hz20, sink.clone());

        assert!(!service.is_streaming());
        assert_eq!(service.rate(), None);
        tokio::time::sleep(std::time::Duration::from_millis(120)).await;
        assert_eq!(service.packet_count(), 0);
        assert!(sink.frames().is_empty());
    }

    #[tokio::test]
    async fn test_single_session_per_service() {
        let service = GyroStreamService::new(SyntheticGyro::new());
        let sink = Arc::new(RecordingSink::default());

        service.start_streaming(StreamRate::Hz20, sink.clone());
        assert_eq!(service.rate(), Some(StreamRate::Hz20));

        // a second start must not replace the running session
        service.start_streaming(StreamRate::Hz50, sink.clone());
        assert_eq!(service.rate(), Some(StreamRate::Hz20));

        service.stop_streaming();
        assert!(!service.is_streaming());
    }

    #[tokio::test]
    async fn test_stop_streaming_is_idempotent() {
        let service = GyroStreamService::new(SyntheticGyro::new());

        service.stop_streaming();
        assert!(!service.is_streaming());

        service.start_streaming(StreamRate::Hz10, Arc::new(RecordingSink::default()));
        service.stop_streaming();
        service.stop_streaming();
        assert!(!service.is_streaming());
    }

    #[tokio::test]
    async fn test_driver_runs_faster_than_output_rate() {
        let service = service_with_script(vec![]);
        service.start_streaming(StreamRate::Hz20, Arc::new(RecordingSink::default()));

        assert_eq!(
            service.driver.configured_update_period(),
            Some(StreamRate::Hz20.update_period())
        );
        assert!(
            service.driver.configured_update_period().unwrap() < StreamRate::Hz20.period()
        );

        service.stop_streaming();
        assert_eq!(service.driver.configured_update_period(), None);
    }
}
