//! Contains the main building blocks for propagators.
//!
//! A propagator narrows the domains of the variables it is defined over, or reports a
//! [`Contradiction`] when the current domains cannot be extended to a solution of its constraint.
//! Propagators are created through a [`PropagatorConstructor`], which subscribes the propagator to
//! the [`DomainEvents`] of its variables. The [`ConstraintSolver`] enqueues the propagator in the
//! [`PropagatorQueue`] whenever one of those events happens.
//!
//! [`Contradiction`]: crate::basic_types::Contradiction
//! [`DomainEvents`]: crate::engine::domain_events::DomainEvents
//! [`ConstraintSolver`]: crate::engine::ConstraintSolver

mod constructor;
mod contexts;
mod propagator;
mod propagator_id;
mod propagator_queue;
mod watch_list;

pub(crate) use constructor::*;
pub(crate) use contexts::*;
pub(crate) use propagator::*;
pub(crate) use propagator_id::PropagatorId;
pub(crate) use propagator_queue::PropagatorQueue;
pub(crate) use watch_list::WatchList;
