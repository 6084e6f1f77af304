use enumset::EnumSet;

use super::domain_events::IntDomainEvent;
use super::variables::DomainId;
use crate::containers::KeyedVec;

/// The domain events raised since the last drain, each `(event, domain)` pair at most once and in
/// the order they first happened.
#[derive(Default, Clone, Debug)]
pub(crate) struct EventSink {
    pending: KeyedVec<DomainId, EnumSet<IntDomainEvent>>,
    order: Vec<(IntDomainEvent, DomainId)>,
}

impl EventSink {
    /// Make room for the domain created last.
    pub(crate) fn grow(&mut self) {
        let _ = self.pending.push(EnumSet::empty());
    }

    pub(crate) fn event_occurred(&mut self, event: IntDomainEvent, domain: DomainId) {
        if self.pending[domain].insert(event) {
            self.order.push((event, domain));
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (IntDomainEvent, DomainId)> + '_ {
        let pending = &mut self.pending;
        self.order.drain(..).inspect(move |&(event, domain)| {
            let _ = pending[domain].remove(event);
        })
    }

    pub(crate) fn clear(&mut self) {
        for (_, domain) in self.order.drain(..) {
            self.pending[domain].clear();
        }
    }
}
