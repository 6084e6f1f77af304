//! Computes reconfiguration plans for a virtualized datacenter.
//!
//! A [`model::Model`] describes the current placement of virtual machines on nodes. Given a set
//! of [`constraints::SatConstraint`]s, the [`DefaultScheduler`] builds a constraint problem over
//! the future placement and the start and end moments of every transition, searches it, and
//! extracts a [`plan::ReconfigurationPlan`] whose application turns the current model into one
//! satisfying all constraints.
//!
//! Large instances can be split into independent partitions with a
//! [`partitioning::PartitioningStrategy`]; partitions are then solved in parallel and their
//! plans merged.
pub(crate) mod asserts;
pub(crate) mod basic_types;
pub mod containers;
pub(crate) mod engine;
pub(crate) mod propagators;

pub(crate) mod branching;
pub(crate) mod problem;
pub(crate) mod search;

pub mod constraints;
pub mod model;
pub mod partitioning;
pub mod plan;
pub mod scheduler;
pub mod statistics;
pub mod termination;

pub use convert_case;
pub use rand;

pub use crate::basic_types::ConstraintOperationError;
pub use crate::basic_types::Random;
pub use crate::scheduler::DefaultScheduler;
pub use crate::scheduler::Instance;
pub use crate::scheduler::SchedulerError;
pub use crate::scheduler::SchedulerParameters;
pub use crate::scheduler::SolvingResult;
