//! # MegaBot
//!
//! Discord side of MegaBot: the poise/serenity client, translation of
//! gateway events into invocation contexts, and the serenity-backed
//! implementations of the command core's collaborator traits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod convert;
pub mod error;
pub mod events;
pub mod guild;
pub mod presence;
pub mod reply;
pub mod slash;

pub use bot::*;
pub use error::*;
