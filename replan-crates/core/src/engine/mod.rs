//! The constraint-solving engine: trailed domains, propagation to a fixpoint and worlds.
mod assignments;
mod constraint_solver;
pub(crate) mod domain_events;
mod event_sink;
pub(crate) mod propagation;
pub(crate) mod test_solver;
pub(crate) mod trailed;
pub(crate) mod variables;

pub(crate) use assignments::Assignments;
pub(crate) use assignments::EmptyDomain;
pub(crate) use constraint_solver::ConstraintSolver;
pub(crate) use event_sink::EventSink;
