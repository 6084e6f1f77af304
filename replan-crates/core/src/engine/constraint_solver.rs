use log::debug;

use super::propagation::Entailment;
use super::propagation::PropagationContext;
use super::propagation::PropagationContextMut;
use super::propagation::Propagator;
use super::propagation::PropagatorConstructor;
use super::propagation::PropagatorConstructorContext;
use super::propagation::PropagatorId;
use super::propagation::PropagatorQueue;
use super::propagation::WatchList;
use super::trailed::TrailedInteger;
use super::variables::DomainId;
use super::variables::Literal;
use super::Assignments;
use super::EmptyDomain;
use super::EventSink;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Contradiction;
use crate::basic_types::PropagationStatus;
use crate::basic_types::Solution;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::propagators::PropagatorKind;
use crate::replan_assert_simple;

/// Owns the variables and propagators of one solving session and runs propagation to a fixpoint.
///
/// The solver is single-threaded. Search drives it through worlds: [`ConstraintSolver::push_world`]
/// before a decision, [`ConstraintSolver::pop_world`] to undo it. Propagators are only added at the
/// root world.
#[derive(Debug, Default)]
pub(crate) struct ConstraintSolver {
    assignments: Assignments,
    event_sink: EventSink,
    watch_list: WatchList,
    propagators: KeyedVec<PropagatorId, PropagatorKind>,
    /// `1` while the propagator is active, `0` once it has been found entailed.
    active: KeyedVec<PropagatorId, TrailedInteger>,
    propagator_queue: PropagatorQueue,
    is_infeasible: bool,
    num_propagations: u64,
}

impl ConstraintSolver {
    pub(crate) fn new_bounded_integer(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        let domain = self.assignments.grow(lower_bound, upper_bound);
        self.grow_watchers();
        domain
    }

    pub(crate) fn new_enumerated_integer(&mut self, values: &[i32]) -> DomainId {
        let domain = self.assignments.grow_enumerated(values);
        self.grow_watchers();
        domain
    }

    pub(crate) fn new_literal(&mut self) -> Literal {
        Literal::new(self.new_enumerated_integer(&[0, 1]))
    }

    pub(crate) fn new_constant(&mut self, value: i32) -> DomainId {
        self.new_bounded_integer(value, value)
    }

    fn grow_watchers(&mut self) {
        self.event_sink.grow();
        self.watch_list.grow();
    }

    /// Add a propagator; it is enqueued and runs during the next call to
    /// [`ConstraintSolver::propagate`].
    pub(crate) fn add_propagator<Constructor: PropagatorConstructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorId, ConstraintOperationError> {
        if self.current_world() != 0 {
            return Err(ConstraintOperationError::NotAtRoot);
        }
        if self.is_infeasible {
            return Err(ConstraintOperationError::InfeasibleState);
        }

        let propagator_id = PropagatorId::create_from_index(self.propagators.len());
        let context = PropagatorConstructorContext::new(
            &mut self.watch_list,
            &mut self.assignments,
            propagator_id,
        );
        let propagator: PropagatorKind = constructor.create(context).into();
        let priority = propagator.priority();

        let _ = self.propagators.push(propagator);
        let _ = self.active.push(self.assignments.new_trailed_integer(1));
        self.propagator_queue
            .enqueue_propagator(propagator_id, priority);

        Ok(propagator_id)
    }

    pub(crate) fn num_propagators(&self) -> usize {
        self.propagators.len()
    }

    pub(crate) fn num_domains(&self) -> usize {
        self.assignments.num_domains()
    }

    pub(crate) fn num_propagations(&self) -> u64 {
        self.num_propagations
    }

    pub(crate) fn domains(&self) -> PropagationContext<'_> {
        PropagationContext::new(&self.assignments)
    }

    pub(crate) fn get_domains(&self) -> impl Iterator<Item = DomainId> {
        self.assignments.get_domains()
    }

    pub(crate) fn solution(&self) -> Solution {
        Solution::from_assignments(&self.assignments)
    }

    pub(crate) fn current_world(&self) -> usize {
        self.assignments.current_world()
    }

    pub(crate) fn push_world(&mut self) {
        replan_assert_simple!(self.propagator_queue.is_empty());
        self.assignments.push_world()
    }

    pub(crate) fn pop_world(&mut self) {
        self.propagator_queue.clear();
        self.event_sink.clear();
        self.assignments.pop_world()
    }

    pub(crate) fn commit_world(&mut self) {
        replan_assert_simple!(self.propagator_queue.is_empty());
        self.assignments.commit_world()
    }

    /// Fix `var` to `value` and propagate.
    pub(crate) fn decide(&mut self, var: DomainId, value: i32) -> PropagationStatus {
        self.narrow(|assignments, events| assignments.instantiate_to(var, value, events))
    }

    /// Remove `value` from `var` and propagate.
    pub(crate) fn refute(&mut self, var: DomainId, value: i32) -> PropagationStatus {
        self.narrow(|assignments, events| assignments.remove_value(var, value, events))
    }

    /// Bound `var` from above and propagate.
    pub(crate) fn enforce_upper_bound(&mut self, var: DomainId, bound: i32) -> PropagationStatus {
        self.narrow(|assignments, events| assignments.tighten_upper_bound(var, bound, events))
    }

    /// Apply a narrowing without propagating; used while building a problem at the root.
    ///
    /// An empty domain makes the solver infeasible.
    pub(crate) fn restrict(
        &mut self,
        narrowing: impl FnOnce(&mut PropagationContextMut) -> Result<bool, EmptyDomain>,
    ) -> Result<(), ConstraintOperationError> {
        if self.is_infeasible {
            return Err(ConstraintOperationError::InfeasibleState);
        }
        let mut context = PropagationContextMut::new(&mut self.assignments, &mut self.event_sink);
        if narrowing(&mut context).is_err() {
            self.is_infeasible = true;
            return Err(ConstraintOperationError::InfeasibleState);
        }
        Ok(())
    }

    fn narrow(
        &mut self,
        narrowing: impl FnOnce(&mut Assignments, &mut EventSink) -> Result<bool, EmptyDomain>,
    ) -> PropagationStatus {
        if let Err(empty_domain) = narrowing(&mut self.assignments, &mut self.event_sink) {
            self.event_sink.clear();
            return Err(empty_domain.into());
        }
        self.propagate()
    }

    /// Run the enqueued propagators until none of them can narrow a domain any further.
    ///
    /// A contradiction found in the root world makes the solver permanently infeasible.
    pub(crate) fn propagate(&mut self) -> PropagationStatus {
        if self.is_infeasible {
            return Err(Contradiction::Conflict);
        }

        self.enqueue_watchers(None);
        while let Some(propagator_id) = self.propagator_queue.pop() {
            if !self.is_active(propagator_id) {
                continue;
            }

            self.num_propagations += 1;
            let context = PropagationContextMut::new(&mut self.assignments, &mut self.event_sink);
            let status = self.propagators[propagator_id].propagate(context);

            if let Err(contradiction) = status {
                self.propagator_queue.clear();
                self.event_sink.clear();
                if self.current_world() == 0 {
                    debug!(
                        "root contradiction raised by {}",
                        self.propagators[propagator_id].name()
                    );
                    self.is_infeasible = true;
                }
                return Err(contradiction);
            }

            let context = PropagationContext::new(&self.assignments);
            if self.propagators[propagator_id].is_entailed(context) == Entailment::True {
                self.assignments
                    .assign_trailed_integer(self.active[propagator_id], 0);
            }

            self.enqueue_watchers(Some(propagator_id));
        }
        Ok(())
    }

    /// Run a single propagator once, without notifying the others of its changes.
    ///
    /// Returns whether it narrowed any domain.
    #[cfg(test)]
    pub(crate) fn propagate_once(
        &mut self,
        propagator_id: PropagatorId,
    ) -> Result<bool, Contradiction> {
        let context = PropagationContextMut::new(&mut self.assignments, &mut self.event_sink);
        let status = self.propagators[propagator_id].propagate(context);
        let changed = !self.event_sink.is_empty();
        self.event_sink.clear();
        status.map(|_| changed)
    }

    fn is_active(&self, propagator_id: PropagatorId) -> bool {
        self.assignments
            .read_trailed_integer(self.active[propagator_id])
            == 1
    }

    /// Drain the event sink and enqueue the active propagators subscribed to the events, except
    /// the one which caused them.
    fn enqueue_watchers(&mut self, source: Option<PropagatorId>) {
        let ConstraintSolver {
            assignments,
            event_sink,
            watch_list,
            propagators,
            active,
            propagator_queue,
            ..
        } = self;

        for (event, domain) in event_sink.drain() {
            for propagator_id in watch_list.watchers(domain, event) {
                if Some(propagator_id) == source
                    || assignments.read_trailed_integer(active[propagator_id]) == 0
                {
                    continue;
                }
                let priority = propagators[propagator_id].priority();
                propagator_queue.enqueue_propagator(propagator_id, priority);
            }
        }
    }
}
