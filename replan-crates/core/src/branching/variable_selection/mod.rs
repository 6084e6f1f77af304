//! [`VariableSelector`]s pick the variable the next decision is about.
mod first_fail;
mod input_order;
mod variable_selector;

pub(crate) use first_fail::FirstFail;
pub(crate) use input_order::InputOrder;
pub(crate) use variable_selector::VariableSelector;
