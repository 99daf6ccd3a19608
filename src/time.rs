//! Frame clock for the simulation loop.
//!
//! One instance is owned by the frame driver and updated exactly once per
//! frame. The first update reports a delta of zero so the simulation never
//! sees a discontinuous jump covering the whole startup phase.

use std::time::Instant;

/// Wall-clock time tracking for the frame loop.
#[derive(Debug)]
pub struct Time {
    start: Instant,
    last_frame: Instant,
    elapsed_secs: f32,
    delta_secs: f32,
    frame_count: u64,
}

impl Time {
    /// Create a new clock starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
        }
    }

    /// Update timing values. Call once per frame.
    ///
    /// Returns `(elapsed_time, delta_time)` for convenience. The very first
    /// call returns a delta of 0.0 regardless of how long initialization
    /// took.
    pub fn update(&mut self) -> (f32, f32) {
        let now = Instant::now();

        self.delta_secs = if self.frame_count == 0 {
            0.0
        } else {
            now.duration_since(self.last_frame).as_secs_f32()
        };
        self.last_frame = now;
        self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        (self.elapsed_secs, self.delta_secs)
    }

    /// Total elapsed time in seconds since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Time since last frame in seconds (delta time).
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.delta(), 0.0);
    }

    #[test]
    fn test_first_update_has_zero_delta() {
        let mut time = Time::new();
        // Simulate a slow startup between construction and the first frame.
        thread::sleep(Duration::from_millis(20));
        let (elapsed, delta) = time.update();

        assert!(elapsed > 0.0);
        assert_eq!(delta, 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_second_update_has_real_delta() {
        let mut time = Time::new();
        time.update();
        thread::sleep(Duration::from_millis(10));
        let (elapsed, delta) = time.update();

        assert!(delta > 0.0);
        assert!(elapsed >= delta);
        assert_eq!(time.frame(), 2);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let mut time = Time::new();
        let (first, _) = time.update();
        thread::sleep(Duration::from_millis(5));
        let (second, _) = time.update();
        assert!(second >= first);
    }
}
