//! Frame timing: per-frame elapsed seconds and a once-a-second FPS counter.

use std::time::Instant;
use tracing::warn;

/// Longest frame time handed to the scene. Longer frames are clamped so a
/// stall does not fling the camera across the map.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Timing for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTiming {
    /// Seconds since the previous frame, clamped to [`MAX_FRAME_TIME`].
    pub frame_time: f32,
    /// Frames counted during the last full second.
    pub fps: u32,
}

/// Measures frame times and counts frames per second.
#[derive(Debug)]
pub struct FrameClock {
    previous_time: Instant,
    second_elapsed: f64,
    frames_this_second: u32,
    fps: u32,
    frame_count: u64,
    total_time: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            previous_time: Instant::now(),
            second_elapsed: 0.0,
            frames_this_second: 0,
            fps: 0,
            frame_count: 0,
            total_time: 0.0,
        }
    }

    /// Measure wall-clock time since the previous tick.
    pub fn tick(&mut self) -> FrameTiming {
        let now = Instant::now();
        let elapsed = now.duration_since(self.previous_time).as_secs_f64();
        self.previous_time = now;
        self.advance(elapsed)
    }

    /// Advance by an explicit `elapsed` seconds.
    pub fn advance(&mut self, elapsed: f64) -> FrameTiming {
        let mut frame_time = elapsed.max(0.0);
        if frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            frame_time = MAX_FRAME_TIME;
        }

        self.frame_count += 1;
        self.total_time += frame_time;
        self.frames_this_second += 1;
        self.second_elapsed += frame_time;
        if self.second_elapsed >= 1.0 {
            self.fps = self.frames_this_second;
            self.frames_this_second = 0;
            self.second_elapsed -= 1.0;
        }

        FrameTiming {
            frame_time: frame_time as f32,
            fps: self.fps,
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sum of (clamped) frame times.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_updates_once_per_second() {
        let mut clock = FrameClock::new();
        let dt = 1.0 / 60.0;
        for _ in 0..59 {
            assert_eq!(clock.advance(dt).fps, 0);
        }
        // Floating error may push the rollover to frame 61.
        let fps = clock.advance(dt).fps.max(clock.advance(dt).fps);
        assert!((60..=61).contains(&fps), "fps {fps}");
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut clock = FrameClock::new();
        let timing = clock.advance(3.0);
        assert!((timing.frame_time - MAX_FRAME_TIME as f32).abs() < 1e-6);
        assert!((clock.total_time() - MAX_FRAME_TIME).abs() < 1e-12);
    }

    #[test]
    fn test_negative_elapsed_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(-1.0).frame_time, 0.0);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn test_tick_measures_wall_clock() {
        let mut clock = FrameClock::new();
        let timing = clock.tick();
        assert!(timing.frame_time >= 0.0);
        assert!(timing.frame_time <= MAX_FRAME_TIME as f32);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn test_slow_frames_report_low_fps() {
        let mut clock = FrameClock::new();
        for _ in 0..4 {
            clock.advance(0.25);
        }
        assert_eq!(clock.fps(), 4);
    }
}
