use super::VariableSelector;
use crate::branching::SelectionContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::DomainId;

/// Selects the first unfixed variable of a fixed list, e.g. the node states in node order.
#[derive(Debug)]
pub(crate) struct InputOrder {
    variables: Vec<DomainId>,
}

impl InputOrder {
    pub(crate) fn new(variables: &[DomainId]) -> Self {
        InputOrder {
            variables: variables.to_vec(),
        }
    }
}

impl VariableSelector for InputOrder {
    fn select_variable(&mut self, context: &SelectionContext) -> Option<DomainId> {
        self.variables
            .iter()
            .find(|&&variable| !context.is_fixed(variable))
            .copied()
    }
}
