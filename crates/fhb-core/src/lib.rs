//! Core domain + application logic for the r/forhire Telegram bot.
//!
//! This crate is framework-agnostic. Telegram and Reddit live behind ports
//! (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod formatting;
pub mod listing;
pub mod locks;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod session;

pub use errors::{Error, Result};
