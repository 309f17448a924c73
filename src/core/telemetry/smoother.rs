//! Rolling smoothing window for the inertial-sensor temperature.

use std::sync::Arc;

use parking_lot::Mutex;

/// Number of samples the window retains.
pub const WINDOW_SIZE: usize = 32;

/// Window shared between the sampler task (writer) and the
/// publication cycle (reader).
pub type SharedWindow = Arc<Mutex<TemperatureWindow>>;

/// Fixed-capacity FIFO ring of recent temperature samples.
///
/// Slots never written hold 0.0 and are excluded from the average, so
/// a warming-up window reports the mean of the samples it actually
/// has. The window is owned state, injected into the sampler loop;
/// there is no ambient global.
#[derive(Debug)]
pub struct TemperatureWindow {
    slots: [f32; WINDOW_SIZE],
}

impl TemperatureWindow {
    pub fn new() -> Self {
        Self {
            slots: [0.0; WINDOW_SIZE],
        }
    }

    /// Evicts the oldest sample and appends `sample` in the last slot.
    pub fn push(&mut self, sample: f32) {
        self.slots.copy_within(1.., 0);
        self.slots[WINDOW_SIZE - 1] = sample;
    }

    /// Mean of the samples seen so far, truncated (not rounded) to one
    /// decimal place. `None` until the first sample lands.
    pub fn average(&self) -> Option<f32> {
        let mut sum = 0.0f32;
        let mut count = 0u32;
        for &sample in &self.slots {
            if sample != 0.0 {
                sum += sample;
                count += 1;
            }
        }
        if count == 0 {
            return None;
        }
        Some(((sum / count as f32) * 10.0) as i32 as f32 / 10.0)
    }
}

impl Default for TemperatureWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window_has_no_average() {
        assert_eq!(TemperatureWindow::new().average(), None);
    }

    #[test]
    fn test_warming_up_average_ignores_unwritten_slots() {
        let mut window = TemperatureWindow::new();
        for sample in [20.0, 20.1, 20.3, 20.0, 20.3] {
            window.push(sample);
        }
        // (20.0 + 20.1 + 20.3 + 20.0 + 20.3) / 5 = 20.14, truncated
        assert_eq!(window.average(), Some(20.1));
    }

    #[test]
    fn test_push_evicts_oldest_at_capacity() {
        let mut window = TemperatureWindow::new();
        for _ in 0..WINDOW_SIZE {
            window.push(5.0);
        }
        window.push(37.0);
        // One 5.0 fell out: (31 * 5.0 + 37.0) / 32 = 6.0
        assert_eq!(window.average(), Some(6.0));
    }

    #[test]
    fn test_average_truncates_instead_of_rounding() {
        let mut window = TemperatureWindow::new();
        window.push(21.19);
        assert_eq!(window.average(), Some(21.1));
    }
}
