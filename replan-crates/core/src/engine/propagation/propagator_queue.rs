use std::collections::VecDeque;

use super::Priority;
use super::PropagatorId;
use crate::containers::HashSet;

/// Propagators waiting to run, one FIFO per [`Priority`]. A propagator is queued at most once.
#[derive(Debug)]
pub(crate) struct PropagatorQueue {
    levels: [VecDeque<PropagatorId>; Priority::NUM_LEVELS],
    enqueued: HashSet<PropagatorId>,
}

impl Default for PropagatorQueue {
    fn default() -> Self {
        PropagatorQueue {
            levels: Default::default(),
            enqueued: HashSet::default(),
        }
    }
}

impl PropagatorQueue {
    pub(crate) fn is_empty(&self) -> bool {
        self.enqueued.is_empty()
    }

    pub(crate) fn enqueue_propagator(&mut self, propagator_id: PropagatorId, priority: Priority) {
        if self.enqueued.insert(propagator_id) {
            self.levels[priority as usize].push_back(propagator_id);
        }
    }

    /// The oldest propagator of the most urgent non-empty level.
    pub(crate) fn pop(&mut self) -> Option<PropagatorId> {
        let propagator_id = self.levels.iter_mut().find_map(VecDeque::pop_front)?;
        let _ = self.enqueued.remove(&propagator_id);
        Some(propagator_id)
    }

    pub(crate) fn clear(&mut self) {
        self.levels.iter_mut().for_each(VecDeque::clear);
        self.enqueued.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_priorities_are_popped_first() {
        let mut queue = PropagatorQueue::default();
        queue.enqueue_propagator(PropagatorId(0), Priority::Low);
        queue.enqueue_propagator(PropagatorId(1), Priority::High);
        queue.enqueue_propagator(PropagatorId(2), Priority::Low);

        assert_eq!(Some(PropagatorId(1)), queue.pop());
        assert_eq!(Some(PropagatorId(0)), queue.pop());
        assert_eq!(Some(PropagatorId(2)), queue.pop());
        assert_eq!(None, queue.pop());
    }

    #[test]
    fn a_propagator_is_enqueued_once() {
        let mut queue = PropagatorQueue::default();
        queue.enqueue_propagator(PropagatorId(0), Priority::Low);
        queue.enqueue_propagator(PropagatorId(0), Priority::Low);

        assert_eq!(Some(PropagatorId(0)), queue.pop());
        assert!(queue.is_empty());
    }

    #[test]
    fn clearing_empties_the_queue() {
        let mut queue = PropagatorQueue::default();
        queue.enqueue_propagator(PropagatorId(0), Priority::Low);
        queue.enqueue_propagator(PropagatorId(1), Priority::Medium);
        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(None, queue.pop());
    }
}
