mod constraint_operation_error;
mod propagation_status;
mod random;
mod solution;
pub(crate) mod time;
mod trail;

pub use constraint_operation_error::ConstraintOperationError;
pub(crate) use propagation_status::*;
pub use random::Random;
#[cfg(test)]
pub(crate) use random::tests::TestRandom;
pub(crate) use solution::Solution;
pub(crate) use trail::Trail;
