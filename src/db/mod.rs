//! Database construction tools.

pub mod create;
