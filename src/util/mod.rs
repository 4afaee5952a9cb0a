//! Shared filesystem utilities.

pub mod atomic;
