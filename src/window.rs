//! Fixed-capacity sliding window of the most recent readings for one sensor.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::time::Duration;

use smokewatch_types::Reading;

/// Number of samples that fit in a monitoring period.
///
/// This is `floor(period / sample_interval)`: 9 for 150s at 30s, 20 for 600s
/// at 30s. Returns `None` when the interval is zero or the period is shorter
/// than a single interval.
pub fn window_capacity(period: Duration, sample_interval: Duration) -> Option<NonZeroUsize> {
    if sample_interval.is_zero() {
        return None;
    }
    let samples = period.as_nanos() / sample_interval.as_nanos();
    NonZeroUsize::new(usize::try_from(samples).ok()?)
}

/// A FIFO ring of readings in arrival order.
///
/// New readings go on the tail; once the window holds `capacity` readings the
/// oldest is evicted from the head on every append. The window is "full" only
/// when it holds exactly `capacity` readings, and only a full window carries
/// enough history to be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    readings: VecDeque<Reading>,
    capacity: NonZeroUsize,
}

impl Window {
    /// Create an empty window.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            readings: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Append a reading at the tail, evicting from the head past capacity.
    pub fn observe(&mut self, reading: Reading) {
        self.readings.push_back(reading);
        while self.readings.len() > self.capacity.get() {
            self.readings.pop_front();
        }
    }

    /// Maximum number of readings held.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// True once the window holds exactly `capacity` readings.
    pub fn is_full(&self) -> bool {
        self.readings.len() == self.capacity.get()
    }

    /// The oldest reading (head).
    pub fn oldest(&self) -> Option<&Reading> {
        self.readings.front()
    }

    /// The most recent reading (tail).
    pub fn newest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smokewatch_types::Sensor;

    fn cap(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn reading(i: usize) -> Reading {
        Reading::new(format!("t{}", i), Sensor::Smoker, i as f64)
    }

    #[test]
    fn test_window_capacity_defaults() {
        let interval = Duration::from_secs(30);
        assert_eq!(
            window_capacity(Duration::from_secs(150), interval),
            Some(cap(9))
        );
        assert_eq!(
            window_capacity(Duration::from_secs(600), interval),
            Some(cap(20))
        );
    }

    #[test]
    fn test_window_capacity_floors() {
        assert_eq!(
            window_capacity(Duration::from_secs(100), Duration::from_secs(30)),
            Some(cap(3))
        );
    }

    #[test]
    fn test_window_capacity_degenerate() {
        assert_eq!(window_capacity(Duration::from_secs(150), Duration::ZERO), None);
        assert_eq!(
            window_capacity(Duration::from_secs(10), Duration::from_secs(30)),
            None
        );
    }

    #[test]
    fn test_len_tracks_min_of_appends_and_capacity() {
        let mut window = Window::new(cap(9));
        assert!(window.is_empty());

        for n in 1..=30 {
            window.observe(reading(n));
            assert_eq!(window.len(), n.min(9));
            assert_eq!(window.is_full(), n >= 9);
        }
    }

    #[test]
    fn test_holds_last_readings_in_arrival_order() {
        let mut window = Window::new(cap(4));

        for n in 1..=3 {
            window.observe(reading(n));
        }
        let values: Vec<f64> = window.iter().map(Reading::value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);

        for n in 4..=10 {
            window.observe(reading(n));
        }
        let values: Vec<f64> = window.iter().map(Reading::value).collect();
        assert_eq!(values, vec![7.0, 8.0, 9.0, 10.0]);
        assert_eq!(window.oldest().map(Reading::timestamp), Some("t7"));
        assert_eq!(window.newest().map(Reading::timestamp), Some("t10"));
    }

    #[test]
    fn test_capacity_one() {
        let mut window = Window::new(cap(1));
        window.observe(reading(1));
        window.observe(reading(2));
        assert_eq!(window.len(), 1);
        assert!(window.is_full());
        assert_eq!(window.oldest(), window.newest());
    }

    #[test]
    fn test_same_input_same_window() {
        let mut a = Window::new(cap(3));
        let mut b = Window::new(cap(3));
        for n in 0..5 {
            a.observe(reading(n));
            b.observe(reading(n));
        }
        assert_eq!(a, b);
    }
}
