//! Depth-first exploration of the search space with binary branching.
//!
//! Every decision lives in its own world. When a decision fails, its world is popped and the
//! opposite decision is made in a new world which is committed into the parent, so it is undone
//! together with the parent decision. When optimising, every refutation also enforces that the
//! objective improves on the best solution found so far.
mod depth_first_search;

pub(crate) use depth_first_search::*;
