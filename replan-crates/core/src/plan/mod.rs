//! Reconfiguration plans: timed actions on the elements of a [`crate::model::Model`].
mod action;
mod reconfiguration_plan;

pub use action::*;
pub use reconfiguration_plan::*;
