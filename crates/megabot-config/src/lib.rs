//! # MegaBot Config
//!
//! Type-safe configuration management for MegaBot.
//!
//! Configuration comes from an optional TOML file and is then overridden by
//! the environment keys the bot has always honoured (`DISCORD_TOKEN`,
//! `PREFIX`, `OWNER_ID`, ...), so a bare `.env` file is still a complete
//! deployment.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::*;
pub use schema::*;
pub use validator::*;
