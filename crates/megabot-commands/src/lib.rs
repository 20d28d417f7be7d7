//! # MegaBot Commands
//!
//! Platform-agnostic command core for MegaBot: the command registry, the
//! cooldown and permission gates, invocation contexts that hide whether a
//! command came from a prefix message or a slash interaction, and the
//! dispatcher tying them together.
//!
//! The built-in commands, the verification button and the anti-nuke guard
//! live here too. They reach Discord only through collaborator traits
//! ([`ReplyChannel`], [`GuildActions`], [`AuditTrail`], [`GuildRestorer`],
//! [`MusicControl`]) implemented by the bot crate.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod antinuke;
pub mod context;
pub mod cooldown;
pub mod dispatcher;
pub mod error;
pub mod framework;
pub mod guild;
pub mod lockdown;
pub mod music;
pub mod permissions;
pub mod ping;
pub mod registry;
pub mod reply;
pub mod verification;

#[cfg(test)]
mod test_support;

pub use antinuke::*;
pub use context::*;
pub use cooldown::*;
pub use dispatcher::*;
pub use error::*;
pub use framework::*;
pub use guild::*;
pub use music::*;
pub use permissions::*;
pub use registry::*;
pub use reply::*;
pub use verification::*;
