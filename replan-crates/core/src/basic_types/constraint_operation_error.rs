use thiserror::Error;

/// Why a propagator or a root narrowing could not be added to the solver.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    /// The solver already proved that no solution exists, possibly because of this operation.
    #[error("the problem is infeasible at the root")]
    InfeasibleState,
    /// Propagators are only added before the search takes its first decision.
    #[error("propagators can only be added at the root")]
    NotAtRoot,
}
