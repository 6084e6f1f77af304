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

/// The [`PropagatorConstructor`] for the [`BinaryNotEqualsPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct BinaryNotEqualsPropagatorArgs {
    pub(crate) a: DomainId,
    pub(crate) b: DomainId,
}

impl PropagatorConstructor for BinaryNotEqualsPropagatorArgs {
    type PropagatorImpl = BinaryNotEqualsPropagator;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let BinaryNotEqualsPropagatorArgs { a, b } = self;

        // We only care about the case where one of the two is assigned
        context.register(a, DomainEvents::ASSIGN);
        context.register(b, DomainEvents::ASSIGN);

        BinaryNotEqualsPropagator { a, b }
    }
}

/// Propagator for the constraint `a != b`.
#[derive(Clone, Debug)]
pub(crate) struct BinaryNotEqualsPropagator {
    a: DomainId,
    b: DomainId,
}

impl Propagator for BinaryNotEqualsPropagator {
    fn name(&self) -> &str {
        "BinaryNotEq"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, mut context: PropagationContextMut) -> PropagationStatus {
        if let Some(value) = context.fixed_value(self.a) {
            let _ = context.remove(self.b, value)?;
        }
        if let Some(value) = context.fixed_value(self.b) {
            let _ = context.remove(self.a, value)?;
        }
        Ok(())
    }

    fn is_entailed(&self, context: PropagationContext) -> Entailment {
        let disjoint = context.upper_bound(self.a) < context.lower_bound(self.b)
            || context.upper_bound(self.b) < context.lower_bound(self.a);
        if disjoint {
            return Entailment::True;
        }

        match (context.fixed_value(self.a), context.fixed_value(self.b)) {
            (Some(a), Some(b)) if a == b => Entailment::False,
            (Some(a), _) if !context.contains(self.b, a) => Entailment::True,
            (_, Some(b)) if !context.contains(self.a, b) => Entailment::True,
            _ => Entailment::Undefined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::TestSolver;

    #[test]
    fn assigned_value_is_removed_from_the_other() {
        let mut solver = TestSolver::default();
        let a = solver.new_sparse_variable(&[0, 1, 2, 3]);
        let b = solver.new_sparse_variable(&[2]);

        let _ = solver
            .new_propagator(BinaryNotEqualsPropagatorArgs { a, b })
            .expect("no empty domains");

        assert!(!solver.contains(a, 2));
        assert!(solver.contains(a, 1));
        assert!(solver.contains(a, 3));
    }

    #[test]
    fn equal_fixed_values_are_a_contradiction() {
        let mut solver = TestSolver::default();
        let a = solver.new_variable(4, 4);
        let b = solver.new_variable(4, 4);

        let result = solver.new_propagator(BinaryNotEqualsPropagatorArgs { a, b });

        assert!(result.is_err());
    }

    #[test]
    fn later_assignments_are_propagated() {
        let mut solver = TestSolver::default();
        let a = solver.new_sparse_variable(&[0, 1, 2]);
        let b = solver.new_sparse_variable(&[0, 1, 2]);
        let _ = solver
            .new_propagator(BinaryNotEqualsPropagatorArgs { a, b })
            .expect("no empty domains");

        solver.assign(b, 1).expect("non-empty domain");
        solver.propagate_until_fixed_point().expect("non-empty domain");

        assert!(!solver.contains(a, 1));
    }
}
