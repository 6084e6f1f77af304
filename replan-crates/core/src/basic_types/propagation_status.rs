use crate::engine::EmptyDomain;

/// The result of invoking a propagator. The propagation can either succeed or identify a
/// contradiction, in which case the current branch of the search is abandoned.
pub(crate) type PropagationStatus = Result<(), Contradiction>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Contradiction {
    /// A narrowing emptied a domain.
    EmptyDomain,
    /// A propagator detected an infeasible partial assignment without emptying a domain.
    Conflict,
}

impl From<EmptyDomain> for Contradiction {
    fn from(_: EmptyDomain) -> Self {
        Contradiction::EmptyDomain
    }
}
