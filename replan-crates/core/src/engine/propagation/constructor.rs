use super::Propagator;
use super::PropagatorId;
use super::PropagationContext;
use super::WatchList;
use crate::engine::domain_events::DomainEvents;
use crate::engine::variables::DomainId;
use crate::engine::Assignments;
use crate::propagators::PropagatorKind;

/// The arguments of a propagator, turned into the propagator once it is posted.
///
/// Creation is where a propagator subscribes to the events of its variables and allocates its
/// trailed counters.
pub(crate) trait PropagatorConstructor {
    type PropagatorImpl: Propagator + Into<PropagatorKind>;

    fn create(self, context: PropagatorConstructorContext) -> Self::PropagatorImpl;
}

/// What a propagator may touch while it is being created.
#[derive(Debug)]
pub(crate) struct PropagatorConstructorContext<'a> {
    watch_list: &'a mut WatchList,
    assignments: &'a mut Assignments,
    propagator_id: PropagatorId,
}

impl<'a> PropagatorConstructorContext<'a> {
    pub(crate) fn new(
        watch_list: &'a mut WatchList,
        assignments: &'a mut Assignments,
        propagator_id: PropagatorId,
    ) -> Self {
        PropagatorConstructorContext {
            watch_list,
            assignments,
            propagator_id,
        }
    }

    /// Enqueue the propagator whenever one of `events` happens on `var`.
    pub(crate) fn register(&mut self, var: DomainId, events: DomainEvents) {
        self.watch_list.watch(var, events, self.propagator_id)
    }

    pub(crate) fn domains(&self) -> PropagationContext<'_> {
        PropagationContext::new(self.assignments)
    }
}
