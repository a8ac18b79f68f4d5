/// Outbound frame dispatch as seen by the sampling side.
///
/// Implementors own the underlying connection. Callers hand over text frames
/// and must never open or close the transport through this seam.
pub trait CommandSink: Send + Sync {
    /// Dispatches one text frame, fire-and-forget.
    ///
    /// Implementations drop the frame when no connection is open and report
    /// transport-level failures through their own observables.
    fn send_message(&self, text: &str);
}
