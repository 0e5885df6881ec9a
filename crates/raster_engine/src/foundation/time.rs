//! Time management utilities

/// Frame timer driven by an external monotonic clock (seconds)
///
/// The window clock is passed in rather than sampled here so the timer stays
/// deterministic under test.
#[derive(Debug, Clone, Default)]
pub struct FrameTimer {
    last_frame: Option<f64>,
    delta_time: f32,
    total_time: f64,
    frame_count: u64,
}

impl FrameTimer {
    /// Create a new timer
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `now` and return the time since the previous tick
    ///
    /// The first tick measures from zero, matching a clock that starts when
    /// the window library initialises.
    pub fn tick(&mut self, now: f64) -> f32 {
        let last = self.last_frame.unwrap_or(0.0);
        self.delta_time = (now - last).max(0.0) as f32;
        self.total_time = now;
        self.last_frame = Some(now);
        self.frame_count += 1;
        self.delta_time
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Clock value at the last tick
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since the clock started
    pub fn average_fps(&self) -> f64 {
        if self.total_time > 0.0 {
            self.frame_count as f64 / self.total_time
        } else {
            0.0
        }
    }
}
