use super::TrailedInteger;

/// Undo record for the first write to `cell` in a world.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TrailedChange {
    pub(crate) cell: TrailedInteger,
    pub(crate) previous: i64,
    /// The world which wrote `previous`.
    pub(crate) previous_stamp: usize,
}
