#![doc = include_str!("../../../README.md")]
//!

//! This crate re-exports the logger, its value and level types, and the
//! storage helpers from `sqlogging-core`.

pub use sqlogging_core::*;
