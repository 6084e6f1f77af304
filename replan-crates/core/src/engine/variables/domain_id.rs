use std::fmt::Debug;
use std::fmt::Display;

use crate::containers::StorageKey;

/// An integer variable of the problem, e.g. the host of a VM or the start of its transition.
///
/// Ids are handed out densely by [`Assignments`](crate::engine::Assignments).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct DomainId(u32);

impl DomainId {
    pub(crate) const fn new(id: u32) -> Self {
        DomainId(id)
    }

    pub(crate) fn id(&self) -> u32 {
        self.0
    }
}

impl StorageKey for DomainId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        DomainId(index as u32)
    }
}

impl Display for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

// Printed like Display so that propagator dumps stay readable.
impl Debug for DomainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
