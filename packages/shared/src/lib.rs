//! Shared utilities for Roomcast packages.

pub mod logger;
pub mod time;
