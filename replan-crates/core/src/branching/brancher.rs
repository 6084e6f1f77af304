use std::fmt::Debug;

use super::Decision;
use super::SelectionContext;

/// A branching strategy.
///
/// Implementations decide which part of the search space is explored next. Every returned
/// [`Decision`] must concern an unfixed variable and a value of its domain; for bounded variables
/// the value must be one of the bounds, since removing an interior value has no effect.
pub(crate) trait Brancher: Debug {
    /// The next decision, or [`None`] if every variable under consideration is fixed.
    ///
    /// The [`SelectionContext`] is only mutable to give access to the random generator.
    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Decision>;

    /// Called after the search undid at least one decision.
    fn on_backtrack(&mut self) {}

    /// Called when every variable is fixed.
    fn on_solution(&mut self) {}
}
