use std::fmt::Display;

use crate::containers::StorageKey;

/// Position of a propagator in the order it was posted to the solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct PropagatorId(pub(crate) u32);

impl Display for PropagatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "propagator #{}", self.0)
    }
}

impl StorageKey for PropagatorId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        PropagatorId(index as u32)
    }
}
