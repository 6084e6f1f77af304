//! The [`Brancher`](super::Brancher) implementations.
mod dynamic_brancher;
mod independent_variable_value_brancher;
mod leaf_first_brancher;
mod placement_brancher;

pub(crate) use dynamic_brancher::DynamicBrancher;
pub(crate) use independent_variable_value_brancher::IndependentVariableValueBrancher;
pub(crate) use leaf_first_brancher::LeafFirstBrancher;
pub(crate) use leaf_first_brancher::Movement;
pub(crate) use placement_brancher::PlacementBrancher;
pub(crate) use placement_brancher::PlacementItem;
