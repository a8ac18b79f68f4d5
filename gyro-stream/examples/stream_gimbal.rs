//! Streams synthetic gyro readings to a gimbal controller.
//!
//! Usage: `cargo run --example stream_gimbal -- [host] [rate_hz]`
//!
//! Defaults to the gimbal's own access point (`192.168.4.1`) at 20 Hz.
//! Stop with ctrl-c; the gimbal is handed back to auto mode on the way out.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use common::ConnectionState;
use gimbal_link::GimbalLink;
use gyro_stream::{GyroStreamService, StreamRate, SyntheticGyro};

const DEFAULT_HOST: &str = "192.168.4.1";
const SYNTHETIC_NOISE_STDEV: f64 = 0.02;
const CONNECT_TIMEOUT_MILLIS: u64 = 5000;

#[tokio::main]
async fn main() {
    env_logger::init();

    let host = env::args().nth(1).unwrap_or_else(|| DEFAULT_HOST.to_string());
    let rate = match env::args().nth(2) {
        Some(raw) => {
            let hz: u32 = raw.parse().expect("rate must be an integer");
            StreamRate::try_from(hz).expect("supported rates are 10, 20 and 50 Hz")
        }
        None => StreamRate::Hz20,
    };

    let link = GimbalLink::new();
    link.connect(&host).expect("invalid gimbal host");

    let deadline = tokio::time::Instant::now() + Duration::from_millis(CONNECT_TIMEOUT_MILLIS);
    while link.state() != ConnectionState::Connected {
        if tokio::time::Instant::now() > deadline || link.state() == ConnectionState::Disconnected
        {
            eprintln!(
                "could not reach the gimbal at {}: {}",
                host,
                link.last_error().unwrap_or_else(|| "timed out".to_string())
            );
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let service = Arc::new(GyroStreamService::new(SyntheticGyro::with_noise(
        SYNTHETIC_NOISE_STDEV,
    )));
    service.start_streaming(rate, Arc::new(link.clone()));
    println!("streaming at {} to ws://{}/ws, ctrl-c to stop", rate, host);

    tokio::signal::ctrl_c().await.ok();

    service.stop_streaming();
    link.disconnect();
    // give the goodbye frame and the close a moment to flush
    tokio::time::sleep(Duration::from_millis(300)).await;
    println!(
        "stopped after {} samples, last reading {:?}",
        service.packet_count(),
        service.last_sample()
    );
}
