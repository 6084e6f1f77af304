use super::ValueSelector;
use crate::branching::SelectionContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::DomainId;

/// Fixes the variable to its smallest value, e.g. the earliest start of an action.
#[derive(Debug, Copy, Clone)]
pub(crate) struct InDomainMin;

impl ValueSelector for InDomainMin {
    fn select_value(&mut self, context: &mut SelectionContext, decision_variable: DomainId) -> i32 {
        context.lower_bound(decision_variable)
    }
}
