//! Per-user, per-command cooldown gate.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use megabot_common::UserId;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::debug;

/// Longest window the gate will record. Longer windows are clamped.
pub const MAX_COOLDOWN_WINDOW: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Cooldown key: one entry per (user, command) pair.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CooldownKey {
    user: UserId,
    command: String,
}

impl CooldownKey {
    fn new(user: UserId, command: &str) -> Self {
        Self {
            user,
            command: command.to_string(),
        }
    }
}

/// Rate limiter keyed by (user, command).
///
/// Entries store their expiry instant and are treated as absent once it has
/// passed, so a stale entry never causes a rejection even before the sweeper
/// removes it. Check-and-record happens under the map's shard lock with no
/// await point in between.
#[derive(Debug, Default)]
pub struct CooldownGate {
    entries: DashMap<CooldownKey, Instant>,
}

impl CooldownGate {
    /// Create an empty gate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to start a cooldown for `user` on `command`.
    ///
    /// With `bypass` set the call always succeeds and records nothing.
    /// Otherwise returns `false` while an unexpired entry exists, and records
    /// `now + window` and returns `true` when none does. Windows longer than
    /// [`MAX_COOLDOWN_WINDOW`] are clamped.
    pub fn try_acquire(
        &self,
        user: UserId,
        command: &str,
        now: Instant,
        window: Duration,
        bypass: bool,
    ) -> bool {
        if bypass {
            return true;
        }

        let expires_at = now
            .checked_add(window.min(MAX_COOLDOWN_WINDOW))
            .unwrap_or(now);
        match self.entries.entry(CooldownKey::new(user, command)) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > now {
                    return false;
                }
                entry.insert(expires_at);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
                true
            }
        }
    }

    /// Time left on an active cooldown.
    pub fn remaining(&self, user: UserId, command: &str, now: Instant) -> Option<Duration> {
        self.entries
            .get(&CooldownKey::new(user, command))
            .and_then(|expires_at| expires_at.checked_duration_since(now))
            .filter(|left| !left.is_zero())
    }

    /// Number of unexpired entries.
    pub fn active_entries(&self, now: Instant) -> usize {
        self.entries.iter().filter(|entry| *entry.value() > now).count()
    }

    /// Remove expired entries, returning how many were dropped.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            debug!("Purged {} expired cooldown entries", purged);
        }
        purged
    }

    /// Clear every cooldown held by a user.
    pub fn clear_user(&self, user: UserId) {
        self.entries.retain(|key, _| key.user != user);
        debug!("Cleared all cooldowns for user {}", user);
    }

    /// Clear every cooldown on a command.
    pub fn clear_command(&self, command: &str) {
        self.entries.retain(|key, _| key.command != command);
        debug!("Cleared all cooldowns for command '{}'", command);
    }

    /// Spawn a task that purges expired entries every `period`.
    pub fn spawn_sweeper(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let gate = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                gate.purge_expired(Instant::now());
            }
        })
    }
}
