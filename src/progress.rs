//! Progress reporting for long-running conversions.

/// Receives progress events while an encoder runs.
///
/// Percentages are 0-100 and never decrease within one conversion. Events are
/// fire-and-forget: a sink cannot cancel or retry the run.
pub trait ProgressSink {
    fn progress(&mut self, percentage: u8, message: &str);
}

/// Any `FnMut(u8, &str)` closure works as a sink.
impl<F: FnMut(u8, &str)> ProgressSink for F {
    fn progress(&mut self, percentage: u8, message: &str) {
        self(percentage, message);
    }
}

/// A sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn progress(&mut self, _percentage: u8, _message: &str) {}
}
