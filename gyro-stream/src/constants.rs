/// Ratio between the driver's update period and the output period. Keeping
/// the driver slightly faster than the outbound cadence guarantees each tick
/// reads a fresh sample.
pub(crate) const DRIVER_UPDATE_FACTOR: f64 = 0.9;
