use crate::branching::SelectionContext;
use crate::engine::variables::DomainId;

/// Picks the variable to branch on among the unfixed ones.
pub(crate) trait VariableSelector {
    /// The variable to branch on next, or [`None`] if every variable is fixed.
    fn select_variable(&mut self, context: &SelectionContext) -> Option<DomainId>;
}
