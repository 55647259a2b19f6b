use std::time::Duration;

pub const DEFAULT_TARGET_FPS: u32 = 60;

/// Frame-rate limiter for the per-frame callback loop.
///
/// Timestamps are monotonic durations from any fixed origin, so the loop can
/// be driven by a real clock or by tests.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: Duration,
    last_frame: Option<Duration>,
    frames: u64,
}

impl Default for FrameThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FPS)
    }
}

impl FrameThrottle {
    pub fn new(target_fps: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / target_fps.max(1),
            last_frame: None,
            frames: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.last_frame.is_some()
    }

    /// Frames fired since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn start(&mut self, now: Duration) {
        if self.last_frame.is_none() {
            self.last_frame = Some(now);
        }
    }

    pub fn stop(&mut self) {
        self.last_frame = None;
    }

    /// Returns the elapsed time since the last fired frame when a new frame
    /// should run, `None` otherwise (or when stopped).
    pub fn tick(&mut self, now: Duration) -> Option<Duration> {
        let last = self.last_frame?;
        let delta = now.saturating_sub(last);
        if delta < self.interval {
            return None;
        }
        self.last_frame = Some(now);
        self.frames += 1;
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_only_after_an_interval() {
        let mut t = FrameThrottle::default();
        assert_eq!(t.tick(ms(100)), None, "not started");
        t.start(ms(0));
        assert_eq!(t.tick(ms(5)), None);
        assert_eq!(t.tick(ms(17)), Some(ms(17)));
        assert_eq!(t.tick(ms(20)), None);
        assert_eq!(t.tick(ms(40)), Some(ms(23)));
        assert_eq!(t.frames(), 2);
    }

    #[test]
    fn stop_pauses_the_loop() {
        let mut t = FrameThrottle::new(30);
        t.start(ms(0));
        t.stop();
        assert!(!t.is_running());
        assert_eq!(t.tick(ms(1000)), None);
        t.start(ms(1000));
        assert!(t.tick(ms(1034)).is_some());
    }

    #[test]
    fn zero_fps_is_treated_as_one() {
        assert_eq!(FrameThrottle::new(0).interval(), Duration::from_secs(1));
    }
}
