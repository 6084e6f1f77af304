//! Time types used throughout the scheduler.
//!
//! All code in replan-core should use these types instead of `std::time` directly.

pub(crate) use std::time::Duration;
pub(crate) use std::time::Instant;
