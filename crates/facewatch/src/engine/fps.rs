//! Frame rate moving average.

use std::collections::VecDeque;
use std::time::Duration;

const WINDOW: usize = 10;

/// Averages the instantaneous frame rate over the last ten frames.
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
    last: Option<Duration>,
    history: VecDeque<f32>,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now`; returns the average once the window is full.
    pub fn tick(&mut self, now: Duration) -> Option<f32> {
        let Some(prev) = self.last.replace(now) else {
            return None;
        };

        let delta = now.saturating_sub(prev).as_secs_f32();
        if delta > 0.0 {
            self.history.push_front(1.0 / delta);
            self.history.truncate(WINDOW);
        }

        if self.history.len() < WINDOW {
            return None;
        }
        Some(self.history.iter().sum::<f32>() / WINDOW as f32)
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_only_after_full_window() {
        let mut meter = FpsMeter::new();
        for i in 0..WINDOW as u64 {
            assert_eq!(meter.tick(Duration::from_millis(i * 50)), None);
        }
        let fps = meter.tick(Duration::from_millis(WINDOW as u64 * 50)).unwrap();
        assert!((fps - 20.0).abs() < 0.01, "fps = {fps}");
    }

    #[test]
    fn duplicate_timestamps_are_ignored() {
        let mut meter = FpsMeter::new();
        meter.tick(Duration::ZERO);
        assert_eq!(meter.tick(Duration::ZERO), None);
        assert!(meter.history.is_empty());
    }
}
