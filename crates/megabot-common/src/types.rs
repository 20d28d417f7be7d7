//! Discord snowflake newtypes used for domain modeling.
//!
//! The core crates never touch serenity's id types directly; the gateway
//! adapter converts at the edge.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw snowflake value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawSnowflake::deserialize(deserializer)?
                    .into_u64()
                    .map(Self)
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Snowflakes show up both as integers and as quoted strings in config files.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSnowflake {
    Int(u64),
    Str(String),
}

impl RawSnowflake {
    fn into_u64(self) -> Result<u64, String> {
        match self {
            Self::Int(value) => Ok(value),
            Self::Str(text) => text
                .trim()
                .parse()
                .map_err(|e| format!("invalid snowflake '{text}': {e}")),
        }
    }
}

snowflake!(
    /// A Discord user ID.
    UserId
);
snowflake!(
    /// A Discord role ID.
    RoleId
);
snowflake!(
    /// A Discord guild (server) ID.
    GuildId
);
snowflake!(
    /// A Discord channel ID.
    ChannelId
);

impl GuildId {
    /// The `@everyone` role of a guild shares the guild's id.
    #[must_use]
    pub const fn everyone_role(self) -> RoleId {
        RoleId(self.0)
    }
}
