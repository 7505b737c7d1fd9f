//! Jittered exponential backoff.

use std::time::Duration;

use rand::Rng;

/// Exponential backoff with full jitter between `min` and the current
/// ceiling.
#[derive(Debug, Clone)]
pub struct Backoff {
    min: Duration,
    max: Duration,
    factor: f64,
    jitter: bool,
    attempt: u32,
}

impl Backoff {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            factor: 2.0,
            jitter: true,
            attempt: 0,
        }
    }

    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Number of delays handed out so far.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Delay before the next retry.
    pub fn next_delay(&mut self) -> Duration {
        let min = self.min.as_secs_f64();
        let max = self.max.as_secs_f64();
        let ceiling = (min * self.factor.powi(self.attempt as i32)).min(max);
        self.attempt = self.attempt.saturating_add(1);

        let secs = if self.jitter && ceiling > min {
            rand::thread_rng().gen_range(min..=ceiling)
        } else {
            ceiling
        };
        Duration::from_secs_f64(secs.max(min))
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grows_without_jitter() {
        let mut backoff = Backoff::default().with_jitter(false);
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
        assert_eq!(backoff.next_delay(), Duration::from_millis(200));
        assert_eq!(backoff.next_delay(), Duration::from_millis(400));
        assert_eq!(backoff.attempt(), 3);
    }

    #[test]
    fn test_capped_at_max() {
        let mut backoff = Backoff::default().with_jitter(false);
        for _ in 0..20 {
            backoff.next_delay();
        }
        assert_eq!(backoff.next_delay(), Duration::from_secs(10));
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let mut backoff = Backoff::default();
        for attempt in 0..12 {
            let delay = backoff.next_delay();
            let ceiling = (0.1 * 2f64.powi(attempt)).min(10.0);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay.as_secs_f64() <= ceiling + 1e-9);
        }
    }

    #[test]
    fn test_reset() {
        let mut backoff = Backoff::default().with_jitter(false);
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.next_delay(), Duration::from_millis(100));
    }
}
