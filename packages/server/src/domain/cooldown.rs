//! Per-user placement cooldown.
//!
//! Pure in-memory logic: callers pass the current time, so the rules can be
//! tested without a clock.

use std::collections::HashMap;

use super::UserId;

/// Outcome of [`CooldownTracker::check_and_record`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    /// Placement may proceed; the user's cooldown now ends at `expires_at`
    Allowed { expires_at: i64 },
    /// Placement refused; the stored expiry is untouched
    Denied { retry_at: i64 },
}

impl CooldownDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Map of `userId` to the time (ms) after which the next placement is allowed
#[derive(Debug, Default)]
pub struct CooldownTracker {
    expiries: HashMap<UserId, i64>,
}

impl CooldownTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `user_id` may place a pixel at `now`
    ///
    /// Denied only while the stored expiry is strictly greater than `now`.
    /// On `Allowed` the expiry becomes `now + cooldown_ms`.
    pub fn check_and_record(
        &mut self,
        user_id: &UserId,
        now: i64,
        cooldown_ms: i64,
    ) -> CooldownDecision {
        if let Some(&expiry) = self.expiries.get(user_id)
            && expiry > now
        {
            return CooldownDecision::Denied { retry_at: expiry };
        }

        let expires_at = now.saturating_add(cooldown_ms);
        self.expiries.insert(user_id.clone(), expires_at);
        CooldownDecision::Allowed { expires_at }
    }

    /// Drop entries that expired at least `retention_ms` before `now`
    ///
    /// A missing entry and an expired one both mean `Allowed`, so sweeping
    /// never changes a decision. Returns the number of evicted entries.
    pub fn sweep(&mut self, now: i64, retention_ms: i64) -> usize {
        let before = self.expiries.len();
        self.expiries
            .retain(|_, expiry| expiry.saturating_add(retention_ms) > now);
        before - self.expiries.len()
    }

    pub fn expiry_of(&self, user_id: &UserId) -> Option<i64> {
        self.expiries.get(user_id).copied()
    }

    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }
}
