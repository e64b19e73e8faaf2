//! Domain logic for client-side operations.
//!
//! Pure functions and state without I/O, so they can be tested directly.

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `current_attempt` - Failed attempts so far
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(current_attempt: u32, max_attempts: u32) -> bool {
    current_attempt < max_attempts
}

/// Local cooldown countdown
///
/// Only a display hint: the server decides whether a placement is accepted.
#[derive(Debug, Clone)]
pub struct CooldownHint {
    cooldown_ms: i64,
    ready_at: Option<i64>,
}

impl CooldownHint {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms: i64::try_from(cooldown_ms).unwrap_or(i64::MAX),
            ready_at: None,
        }
    }

    /// Remember a placement sent at `now`
    pub fn record_placement(&mut self, now: i64) {
        self.ready_at = Some(now.saturating_add(self.cooldown_ms));
    }

    /// Milliseconds left before the next placement is expected to pass
    pub fn remaining_ms(&self, now: i64) -> Option<i64> {
        self.ready_at
            .map(|ready_at| ready_at - now)
            .filter(|remaining| *remaining > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_attempt_reconnect() {
        // テスト項目: 試行回数が上限未満の間だけ再接続する
        // given (前提条件):
        let max_attempts = 5;

        // when (操作):
        let first = should_attempt_reconnect(0, max_attempts);
        let last = should_attempt_reconnect(4, max_attempts);
        let exhausted = should_attempt_reconnect(5, max_attempts);

        // then (期待する結果):
        assert!(first);
        assert!(last);
        assert!(!exhausted);
    }

    #[test]
    fn test_cooldown_hint_counts_down() {
        // テスト項目: 配置後はクールダウンの残り時間が減っていき、期限で消える
        // given (前提条件):
        let mut hint = CooldownHint::new(30_000);

        // when (操作):
        let before = hint.remaining_ms(0);
        hint.record_placement(1_000);

        // then (期待する結果):
        assert_eq!(before, None);
        assert_eq!(hint.remaining_ms(1_000), Some(30_000));
        assert_eq!(hint.remaining_ms(21_000), Some(10_000));
        assert_eq!(hint.remaining_ms(31_000), None);
    }
}
