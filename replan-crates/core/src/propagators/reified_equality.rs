use crate::basic_types::PropagationStatus;
use crate::engine::domain_events::DomainEvents;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::Priority;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::DomainId;
use crate::engine::variables::Literal;

/// The [`PropagatorConstructor`] for the [`ReifiedEqualityPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct ReifiedEqualityPropagatorArgs {
    pub(crate) literal: Literal,
    pub(crate) var: DomainId,
    pub(crate) value: i32,
}

impl PropagatorConstructor for ReifiedEqualityPropagatorArgs {
    type PropagatorImpl = ReifiedEqualityPropagator;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let ReifiedEqualityPropagatorArgs {
            literal,
            var,
            value,
        } = self;

        context.register(literal.domain_id(), DomainEvents::ASSIGN);
        context.register(var, DomainEvents::ANY_INT);

        ReifiedEqualityPropagator {
            literal,
            var,
            value,
        }
    }
}

/// Propagator for `literal <-> (var == value)`.
///
/// Used to tie the "stays on its host" and "does not move" facts of a VM to its variables.
#[derive(Clone, Debug)]
pub(crate) struct ReifiedEqualityPropagator {
    literal: Literal,
    var: DomainId,
    value: i32,
}

impl Propagator for ReifiedEqualityPropagator {
    fn name(&self) -> &str {
        "ReifiedEq"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, mut context: PropagationContextMut) -> PropagationStatus {
        if context.is_true(self.literal) {
            let _ = context.instantiate(self.var, self.value)?;
        } else if context.is_false(self.literal) {
            let _ = context.remove(self.var, self.value)?;
        } else if let Some(fixed) = context.fixed_value(self.var) {
            let _ = context.set_literal(self.literal, fixed == self.value)?;
        } else if !context.contains(self.var, self.value) {
            let _ = context.set_literal(self.literal, false)?;
        }
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext) -> Entailment {
        let holds = context.fixed_value(self.var) == Some(self.value);
        let excluded = !context.contains(self.var, self.value);

        if context.is_true(self.literal) {
            if holds {
                Entailment::True
            } else if excluded {
                Entailment::False
            } else {
                Entailment::Undefined
            }
        } else if context.is_false(self.literal) {
            if excluded {
                Entailment::True
            } else if holds {
                Entailment::False
            } else {
                Entailment::Undefined
            }
        } else {
            Entailment::Undefined
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::TestSolver;

    #[test]
    fn true_literal_instantiates_the_variable() {
        let mut solver = TestSolver::default();
        let literal = solver.new_literal();
        let var = solver.new_sparse_variable(&[0, 3, 5]);
        solver.set_literal(literal, true).expect("non-empty domain");

        let _ = solver
            .new_propagator(ReifiedEqualityPropagatorArgs {
                literal,
                var,
                value: 3,
            })
            .expect("no empty domains");

        solver.assert_bounds(var, 3, 3);
    }

    #[test]
    fn false_literal_removes_the_value() {
        let mut solver = TestSolver::default();
        let literal = solver.new_literal();
        let var = solver.new_sparse_variable(&[0, 3, 5]);
        solver.set_literal(literal, false).expect("non-empty domain");

        let _ = solver
            .new_propagator(ReifiedEqualityPropagatorArgs {
                literal,
                var,
                value: 3,
            })
            .expect("no empty domains");

        assert!(!solver.contains(var, 3));
        solver.assert_bounds(var, 0, 5);
    }

    #[test]
    fn fixed_variable_sets_the_literal() {
        let mut solver = TestSolver::default();
        let literal = solver.new_literal();
        let var = solver.new_sparse_variable(&[0, 3, 5]);
        let _ = solver
            .new_propagator(ReifiedEqualityPropagatorArgs {
                literal,
                var,
                value: 3,
            })
            .expect("no empty domains");
        assert!(!solver.is_literal_true(literal) && !solver.is_literal_false(literal));

        solver.assign(var, 5).expect("non-empty domain");
        solver.propagate_until_fixed_point().expect("non-empty domain");

        assert!(solver.is_literal_false(literal));
    }

    #[test]
    fn removed_value_falsifies_the_literal() {
        let mut solver = TestSolver::default();
        let literal = solver.new_literal();
        let var = solver.new_sparse_variable(&[0, 3, 5]);
        let _ = solver
            .new_propagator(ReifiedEqualityPropagatorArgs {
                literal,
                var,
                value: 0,
            })
            .expect("no empty domains");

        solver.set_lower_bound(var, 1).expect("non-empty domain");
        solver.propagate_until_fixed_point().expect("non-empty domain");

        assert!(solver.is_literal_false(literal));
    }

    #[test]
    fn contradicting_literal_fails() {
        let mut solver = TestSolver::default();
        let literal = solver.new_literal();
        let var = solver.new_variable(1, 4);
        solver.set_literal(literal, true).expect("non-empty domain");

        let result = solver.new_propagator(ReifiedEqualityPropagatorArgs {
            literal,
            var,
            value: 0,
        });

        assert!(result.is_err());
    }

    #[test]
    fn propagation_is_idempotent() {
        let mut solver = TestSolver::default();
        let literal = solver.new_literal();
        let var = solver.new_sparse_variable(&[0, 3, 5]);
        let propagator = solver
            .new_propagator(ReifiedEqualityPropagatorArgs {
                literal,
                var,
                value: 3,
            })
            .expect("no empty domains");
        solver.set_literal(literal, false).expect("non-empty domain");
        solver.propagate_until_fixed_point().expect("non-empty domain");

        assert_eq!(Ok(false), solver.propagate_once(propagator));
    }
}
