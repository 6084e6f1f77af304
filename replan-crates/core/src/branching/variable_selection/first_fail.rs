use log::warn;

use super::VariableSelector;
use crate::branching::SelectionContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::DomainId;

/// A [`VariableSelector`] which selects the unfixed variable with the smallest domain; ties are
/// broken by the order in which the variables were given.
#[derive(Debug)]
pub(crate) struct FirstFail {
    variables: Vec<DomainId>,
}

impl FirstFail {
    pub(crate) fn new(variables: &[DomainId]) -> Self {
        if variables.is_empty() {
            warn!("first-fail selection over no variables");
        }
        FirstFail {
            variables: variables.to_vec(),
        }
    }
}

impl VariableSelector for FirstFail {
    fn select_variable(&mut self, context: &SelectionContext) -> Option<DomainId> {
        self.variables
            .iter()
            .copied()
            .filter(|&variable| !context.is_fixed(variable))
            .min_by_key(|&variable| context.size(variable))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::TestRandom;
    use crate::engine::ConstraintSolver;

    #[test]
    fn the_smallest_unfixed_domain_is_selected() {
        let mut solver = ConstraintSolver::default();
        let wide = solver.new_bounded_integer(0, 10);
        let narrow = solver.new_bounded_integer(3, 5);
        let fixed = solver.new_bounded_integer(4, 4);
        let mut selector = FirstFail::new(&[wide, fixed, narrow]);

        let mut random = TestRandom::default();
        let context = SelectionContext::new(solver.domains(), &mut random);
        assert_eq!(Some(narrow), selector.select_variable(&context));
    }

    #[test]
    fn ties_are_broken_by_input_order() {
        let mut solver = ConstraintSolver::default();
        let first = solver.new_enumerated_integer(&[1, 4]);
        let second = solver.new_bounded_integer(0, 1);
        let mut selector = FirstFail::new(&[first, second]);

        let mut random = TestRandom::default();
        let context = SelectionContext::new(solver.domains(), &mut random);
        assert_eq!(Some(first), selector.select_variable(&context));
    }

    #[test]
    fn nothing_is_selected_once_everything_is_fixed() {
        let mut solver = ConstraintSolver::default();
        let fixed = solver.new_constant(2);
        let mut selector = FirstFail::new(&[fixed]);

        let mut random = TestRandom::default();
        let context = SelectionContext::new(solver.domains(), &mut random);
        assert_eq!(None, selector.select_variable(&context));
    }
}
