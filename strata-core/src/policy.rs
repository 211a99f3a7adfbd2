use rand::Rng;
use std::time::Duration;

/// How a lost connection is re-established.
///
/// Disabled by default, the original failure surfaces right away.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    /// `None` retries forever.
    pub attempts: Option<u32>,
    pub base_delay: Duration,
    pub backoff: f64,
    pub max_delay: Duration,
    /// Randomizes each sleep by up to 25% in either direction.
    pub jitter: bool,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            attempts: Some(3),
            base_delay: Duration::from_millis(100),
            backoff: 2.0,
            max_delay: Duration::from_secs(30),
            jitter: false,
        }
    }
}

impl ReconnectPolicy {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.attempts = None;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn backoff(mut self, backoff: f64) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Whether attempt number `attempt` (from 0) may still run.
    pub fn allows(&self, attempt: u32) -> bool {
        self.attempts.is_none_or(|max| attempt < max)
    }

    /// Sleep before attempt number `attempt`, without jitter: `min(base * backoff^attempt, max)`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let seconds = self.base_delay.as_secs_f64() * self.backoff.powi(exponent);
        let max = self.max_delay.as_secs_f64();
        if !seconds.is_finite() || seconds >= max {
            return self.max_delay;
        }
        Duration::from_secs_f64(seconds.max(0.0))
    }

    /// Actual sleep before attempt number `attempt`, the first attempt does not wait.
    pub fn sleep_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let delay = self.delay(attempt);
        if !self.jitter {
            return delay;
        }
        let factor = 1.0 + rand::thread_rng().gen_range(-0.25..=0.25);
        delay.mul_f64(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_capped_and_non_decreasing() {
        let policy = ReconnectPolicy::new()
            .base_delay(Duration::from_millis(100))
            .backoff(2.0)
            .max_delay(Duration::from_secs(1));
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(3), Duration::from_millis(800));
        assert_eq!(policy.delay(4), Duration::from_secs(1));
        assert_eq!(policy.delay(500), Duration::from_secs(1));
        let delays: Vec<_> = (0..64).map(|v| policy.delay(v)).collect();
        assert!(delays.windows(2).all(|v| v[0] <= v[1]));
    }

    #[test]
    fn jitter_stays_within_a_quarter() {
        let policy = ReconnectPolicy::new()
            .base_delay(Duration::from_secs(1))
            .backoff(1.0)
            .jitter(true);
        assert_eq!(policy.sleep_before(0), Duration::ZERO);
        for _ in 0..100 {
            let sleep = policy.sleep_before(1);
            assert!(sleep >= Duration::from_millis(750), "{:?}", sleep);
            assert!(sleep <= Duration::from_millis(1250), "{:?}", sleep);
        }
    }

    #[test]
    fn attempts() {
        let policy = ReconnectPolicy::new().attempts(2);
        assert!(policy.allows(0));
        assert!(policy.allows(1));
        assert!(!policy.allows(2));
        assert!(ReconnectPolicy::new().unbounded().allows(u32::MAX));
    }
}
