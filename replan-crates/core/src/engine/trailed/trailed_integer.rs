use crate::containers::StorageKey;

/// Handle to an `i64` cell whose writes are undone on backtracking, e.g. a domain bound or the
/// active flag of a propagator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TrailedInteger(u32);

impl StorageKey for TrailedInteger {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        TrailedInteger(index as u32)
    }
}
