//! Shared utilities for chatrelay binaries and libraries.

pub mod logger;
pub mod time;
