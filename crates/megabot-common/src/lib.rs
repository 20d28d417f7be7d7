//! # MegaBot Common
//!
//! Shared identifiers, errors, logging setup and utilities for MegaBot.
//!
//! This crate provides the foundational types used across all other crates
//! in the MegaBot workspace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::*;
pub use logging::{LogFormat, LoggingConfig};
pub use types::*;
pub use utils::*;
