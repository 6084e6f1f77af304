use crate::branching::SelectionContext;
use crate::engine::variables::DomainId;

/// Picks the value the selected variable is fixed to.
pub(crate) trait ValueSelector {
    /// A value in the domain of `decision_variable`, which has at least two values.
    fn select_value(&mut self, context: &mut SelectionContext, decision_variable: DomainId) -> i32;
}
