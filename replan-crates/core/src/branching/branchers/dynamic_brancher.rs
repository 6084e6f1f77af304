use crate::branching::Brancher;
use crate::branching::Decision;
use crate::branching::SelectionContext;

/// Chains branchers: the next one is consulted once the current one has no decision left.
///
/// The position in the chain is reset on every backtrack and solution, since either may unfix
/// variables of an earlier brancher.
#[derive(Debug)]
pub(crate) struct DynamicBrancher {
    branchers: Vec<Box<dyn Brancher>>,
    brancher_index: usize,
}

impl DynamicBrancher {
    pub(crate) fn new(branchers: Vec<Box<dyn Brancher>>) -> Self {
        Self {
            branchers,
            brancher_index: 0,
        }
    }

    pub(crate) fn add_brancher(&mut self, brancher: Box<dyn Brancher>) {
        self.branchers.push(brancher)
    }
}

impl Brancher for DynamicBrancher {
    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Decision> {
        loop {
            if self.brancher_index >= self.branchers.len() {
                return None;
            }
            if let Some(decision) = self.branchers[self.brancher_index].next_decision(context) {
                return Some(decision);
            }
            self.brancher_index += 1;
        }
    }

    fn on_backtrack(&mut self) {
        // Variables of any brancher may have been unfixed.
        self.brancher_index = 0;
        self.branchers
            .iter_mut()
            .for_each(|brancher| brancher.on_backtrack());
    }

    fn on_solution(&mut self) {
        self.brancher_index = 0;
        self.branchers
            .iter_mut()
            .for_each(|brancher| brancher.on_solution());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::TestRandom;
    use crate::branching::FirstFail;
    use crate::branching::InDomainMin;
    use crate::branching::IndependentVariableValueBrancher;
    use crate::engine::ConstraintSolver;

    #[test]
    fn branchers_are_used_in_order() {
        let mut solver = ConstraintSolver::default();
        let first = solver.new_bounded_integer(0, 1);
        let second = solver.new_bounded_integer(5, 9);
        let mut brancher = DynamicBrancher::new(Vec::new());
        brancher.add_brancher(Box::new(IndependentVariableValueBrancher::new(
            FirstFail::new(&[first]),
            InDomainMin,
        )));
        brancher.add_brancher(Box::new(IndependentVariableValueBrancher::new(
            FirstFail::new(&[second]),
            InDomainMin,
        )));

        let mut random = TestRandom::default();
        let mut context = SelectionContext::new(solver.domains(), &mut random);
        assert_eq!(Some(Decision::new(first, 0)), brancher.next_decision(&mut context));

        solver.push_world();
        assert!(solver.decide(first, 0).is_ok());
        let mut context = SelectionContext::new(solver.domains(), &mut random);
        assert_eq!(Some(Decision::new(second, 5)), brancher.next_decision(&mut context));

        solver.pop_world();
        brancher.on_backtrack();
        let mut context = SelectionContext::new(solver.domains(), &mut random);
        assert_eq!(Some(Decision::new(first, 0)), brancher.next_decision(&mut context));
    }
}
