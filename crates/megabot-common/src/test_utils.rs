//! Test utilities and shared fixtures for the MegaBot workspace.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call from every test; only the
/// first call installs the subscriber.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        // Another test harness may already have installed a subscriber.
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Discord-related test fixtures.
pub mod discord_fixtures {
    use crate::{ChannelId, GuildId, RoleId, UserId};

    /// A guild used across tests.
    pub fn test_guild_id() -> GuildId {
        GuildId(111_111_111_111_111_111)
    }

    /// A text channel used across tests.
    pub fn test_channel_id() -> ChannelId {
        ChannelId(123_456_789_012_345_678)
    }

    /// A regular (non-owner) user.
    pub fn test_user_id() -> UserId {
        UserId(987_654_321_098_765_432)
    }

    /// The configured bot owner.
    pub fn test_owner_id() -> UserId {
        UserId(100_000_000_000_000_001)
    }

    /// A role used as the required role of gated commands.
    pub fn test_role_id() -> RoleId {
        RoleId(555_555_555_555_555_555)
    }

    /// Create multiple distinct user IDs.
    pub fn test_user_ids(count: usize) -> Vec<UserId> {
        (0..count as u64)
            .map(|i| UserId(200_000_000_000_000_000 + i))
            .collect()
    }
}
