//! Frame timing
//!
//! Turns display-refresh timestamps into capped simulation deltas. The
//! platform layer owns the actual callback registration; this only tracks the
//! baseline so a resumed loop never hands the simulation a huge step.

use crate::consts::MAX_FRAME_DELTA_MS;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameScheduler {
    running: bool,
    last_ms: Option<f64>,
    max_delta_ms: f32,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(MAX_FRAME_DELTA_MS)
    }
}

impl FrameScheduler {
    pub fn new(max_delta_ms: f32) -> Self {
        Self {
            running: false,
            last_ms: None,
            max_delta_ms,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
        self.last_ms = None;
    }

    /// Stop and forget the baseline
    pub fn stop(&mut self) {
        self.running = false;
        self.last_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Feed a refresh timestamp. Returns the delta to simulate, or `None` for
    /// the first frame after a (re)start and while stopped.
    pub fn on_frame(&mut self, now_ms: f64) -> Option<f32> {
        if !self.running {
            return None;
        }
        let last = self.last_ms.replace(now_ms)?;
        // Clocks can step backwards after a tab restore
        let delta = (now_ms - last).max(0.0) as f32;
        Some(delta.min(self.max_delta_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_has_no_delta() {
        let mut scheduler = FrameScheduler::default();
        scheduler.start();
        assert_eq!(scheduler.on_frame(1000.0), None);
        assert_eq!(scheduler.on_frame(1016.0), Some(16.0));
    }

    #[test]
    fn test_delta_is_capped() {
        let mut scheduler = FrameScheduler::default();
        scheduler.start();
        scheduler.on_frame(0.0);
        assert_eq!(scheduler.on_frame(5_000.0), Some(100.0));
        assert_eq!(scheduler.on_frame(4_000.0), Some(0.0));
    }

    #[test]
    fn test_restart_resets_baseline() {
        let mut scheduler = FrameScheduler::default();
        scheduler.start();
        scheduler.on_frame(0.0);
        scheduler.on_frame(16.0);
        scheduler.stop();
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.on_frame(32.0), None);

        scheduler.start();
        assert_eq!(scheduler.on_frame(10_000.0), None);
        assert_eq!(scheduler.on_frame(10_020.0), Some(20.0));
    }
}
