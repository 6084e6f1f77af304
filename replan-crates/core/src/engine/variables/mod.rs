//! Handles to the decision variables of a [`ConstraintSolver`].
//!
//! [`ConstraintSolver`]: crate::engine::ConstraintSolver
mod domain_id;
mod literal;

pub(crate) use domain_id::DomainId;
pub(crate) use literal::Literal;
