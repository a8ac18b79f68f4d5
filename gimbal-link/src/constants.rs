/// Delay between initiating a connection and dispatching the manual-mode
/// command, leaving the socket time to open.
pub(crate) const MANUAL_MODE_DELAY_MILLIS: u64 = 500;

/// Grace period between the auto-mode command and the socket teardown, so the
/// command can flush before the link goes away.
pub(crate) const DISCONNECT_GRACE_MILLIS: u64 = 100;
