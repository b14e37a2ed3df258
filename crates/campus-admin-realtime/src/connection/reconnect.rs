//! Bounded fixed-delay reconnect policy.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use campus_admin_core::config::realtime::RealtimeConfig;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Attempts allowed before giving up.
    pub max_attempts: u32,
    /// Fixed wait before each attempt.
    pub delay: Duration,
}

impl ReconnectPolicy {
    /// Build the policy from configuration.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            max_attempts: config.max_reconnect_attempts,
            delay: config.reconnect_delay(),
        }
    }
}

/// Attempt counter plus the token of the one pending reconnect timer.
#[derive(Debug, Default)]
pub(crate) struct ReconnectState {
    /// Attempts scheduled since the last successful open.
    pub attempts: u32,
    /// Cancels the pending timer, if one is scheduled.
    pub pending: Option<CancellationToken>,
}

impl ReconnectState {
    /// Clear the counter after a successful open or an explicit connect.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Claim the next attempt number, or `None` once the budget is spent.
    pub fn next_attempt(&mut self, policy: &ReconnectPolicy) -> Option<u32> {
        if self.attempts >= policy.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.attempts)
    }

    /// Cancel the pending timer. Returns whether one was pending.
    pub fn cancel_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_attempts: u32) -> ReconnectPolicy {
        ReconnectPolicy {
            max_attempts,
            delay: Duration::from_millis(10),
        }
    }

    #[test]
    fn test_attempts_are_bounded() {
        let mut state = ReconnectState::default();
        let policy = policy(5);
        let claimed: Vec<u32> = std::iter::from_fn(|| state.next_attempt(&policy)).collect();
        assert_eq!(claimed, vec![1, 2, 3, 4, 5]);
        assert_eq!(state.next_attempt(&policy), None);
        assert_eq!(state.attempts, 5);
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut state = ReconnectState::default();
        let policy = policy(2);
        state.next_attempt(&policy);
        state.next_attempt(&policy);
        assert_eq!(state.next_attempt(&policy), None);

        state.reset();
        assert_eq!(state.next_attempt(&policy), Some(1));
    }

    #[test]
    fn test_zero_budget_never_retries() {
        let mut state = ReconnectState::default();
        assert_eq!(state.next_attempt(&policy(0)), None);
    }

    #[test]
    fn test_cancel_pending() {
        let mut state = ReconnectState::default();
        assert!(!state.cancel_pending());

        let token = CancellationToken::new();
        state.pending = Some(token.clone());
        assert!(state.cancel_pending());
        assert!(token.is_cancelled());
        assert!(state.pending.is_none());
    }

    #[test]
    fn test_policy_from_config() {
        let policy = ReconnectPolicy::from_config(&RealtimeConfig::default());
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_millis(3000));
    }
}
