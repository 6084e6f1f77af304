#![cfg(test)]
//! This module exposes helpers that aid testing of propagators. The [`TestSolver`] allows
//! setting up specific scenarios under which to test the various operations of a propagator.
use super::propagation::PropagatorConstructor;
use super::propagation::PropagatorId;
use super::propagation::ReadDomains;
use super::variables::DomainId;
use super::variables::Literal;
use super::ConstraintSolver;
use crate::basic_types::Contradiction;
use crate::basic_types::PropagationStatus;

/// A container for variables, which can be used to test propagators.
#[derive(Debug, Default)]
pub(crate) struct TestSolver {
    pub(crate) solver: ConstraintSolver,
}

impl TestSolver {
    pub(crate) fn new_variable(&mut self, lb: i32, ub: i32) -> DomainId {
        self.solver.new_bounded_integer(lb, ub)
    }

    pub(crate) fn new_sparse_variable(&mut self, values: &[i32]) -> DomainId {
        self.solver.new_enumerated_integer(values)
    }

    pub(crate) fn new_literal(&mut self) -> Literal {
        self.solver.new_literal()
    }

    /// Add the propagator and propagate to a fixpoint.
    pub(crate) fn new_propagator<Constructor: PropagatorConstructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorId, Contradiction> {
        let propagator_id = self
            .solver
            .add_propagator(constructor)
            .map_err(|_| Contradiction::Conflict)?;
        self.solver.propagate()?;
        Ok(propagator_id)
    }

    pub(crate) fn propagate_until_fixed_point(&mut self) -> PropagationStatus {
        self.solver.propagate()
    }

    /// Invoke a single propagator once; returns whether it changed a domain.
    pub(crate) fn propagate_once(
        &mut self,
        propagator: PropagatorId,
    ) -> Result<bool, Contradiction> {
        self.solver.propagate_once(propagator)
    }

    pub(crate) fn set_lower_bound(
        &mut self,
        var: DomainId,
        bound: i32,
    ) -> Result<(), Contradiction> {
        self.solver
            .restrict(|context| context.set_lower_bound(var, bound))
            .map_err(|_| Contradiction::EmptyDomain)
    }

    pub(crate) fn set_upper_bound(
        &mut self,
        var: DomainId,
        bound: i32,
    ) -> Result<(), Contradiction> {
        self.solver
            .restrict(|context| context.set_upper_bound(var, bound))
            .map_err(|_| Contradiction::EmptyDomain)
    }

    pub(crate) fn remove(&mut self, var: DomainId, value: i32) -> Result<(), Contradiction> {
        self.solver
            .restrict(|context| context.remove(var, value))
            .map_err(|_| Contradiction::EmptyDomain)
    }

    pub(crate) fn assign(&mut self, var: DomainId, value: i32) -> Result<(), Contradiction> {
        self.solver
            .restrict(|context| context.instantiate(var, value))
            .map_err(|_| Contradiction::EmptyDomain)
    }

    pub(crate) fn set_literal(
        &mut self,
        literal: Literal,
        value: bool,
    ) -> Result<(), Contradiction> {
        self.assign(literal.domain_id(), value as i32)
    }

    pub(crate) fn lower_bound(&self, var: DomainId) -> i32 {
        self.solver.domains().lower_bound(var)
    }

    pub(crate) fn upper_bound(&self, var: DomainId) -> i32 {
        self.solver.domains().upper_bound(var)
    }

    pub(crate) fn contains(&self, var: DomainId, value: i32) -> bool {
        self.solver.domains().contains(var, value)
    }

    pub(crate) fn is_literal_true(&self, literal: Literal) -> bool {
        self.solver.domains().is_true(literal)
    }

    pub(crate) fn is_literal_false(&self, literal: Literal) -> bool {
        self.solver.domains().is_false(literal)
    }

    pub(crate) fn assert_bounds(&self, var: DomainId, lb: i32, ub: i32) {
        let actual_lb = self.lower_bound(var);
        let actual_ub = self.upper_bound(var);

        assert_eq!(
            (lb, ub), (actual_lb, actual_ub),
            "expected [{lb}..{ub}] but got [{actual_lb}..{actual_ub}]"
        );
    }
}
