use enumset::EnumSet;

use super::PropagatorId;
use crate::containers::KeyedVec;
use crate::engine::domain_events::DomainEvents;
use crate::engine::domain_events::IntDomainEvent;
use crate::engine::variables::DomainId;

/// For every variable, the propagators subscribed to its domain events.
#[derive(Debug, Default, Clone)]
pub(crate) struct WatchList {
    watchers: KeyedVec<DomainId, Vec<(PropagatorId, EnumSet<IntDomainEvent>)>>,
}

impl WatchList {
    pub(crate) fn grow(&mut self) {
        let _ = self.watchers.push(Vec::new());
    }

    pub(crate) fn watch(
        &mut self,
        domain: DomainId,
        events: DomainEvents,
        propagator: PropagatorId,
    ) {
        let watchers = &mut self.watchers[domain];
        match watchers.iter_mut().find(|(id, _)| *id == propagator) {
            Some((_, subscribed)) => subscribed.insert_all(events.get_int_events()),
            None => watchers.push((propagator, events.get_int_events())),
        }
    }

    /// The propagators subscribed to `event` on `domain`.
    pub(crate) fn watchers(
        &self,
        domain: DomainId,
        event: IntDomainEvent,
    ) -> impl Iterator<Item = PropagatorId> + '_ {
        self.watchers[domain]
            .iter()
            .filter(move |(_, events)| events.contains(event))
            .map(|&(propagator, _)| propagator)
    }
}
