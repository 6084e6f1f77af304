//! Contains the propagators used to express reconfiguration problems.
//!
//! The set of propagators is closed: every propagator is a variant of [`PropagatorKind`], which
//! dispatches the [`Propagator`] contract to the concrete implementation.
pub(crate) mod arithmetic;
pub(crate) mod bin_packing;
pub(crate) mod precedences;
pub(crate) mod reified_equality;
pub(crate) mod task_scheduler;

pub(crate) use arithmetic::*;
pub(crate) use bin_packing::*;
pub(crate) use precedences::*;
pub(crate) use reified_equality::*;
pub(crate) use task_scheduler::*;

use crate::basic_types::PropagationStatus;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::Priority;

#[derive(Clone, Debug)]
pub(crate) enum PropagatorKind {
    LinearLessOrEqual(LinearLessOrEqualPropagator),
    BinaryNotEquals(BinaryNotEqualsPropagator),
    ReifiedEquality(ReifiedEqualityPropagator),
    Precedences(PrecedencesPropagator),
    BinPacking(BinPackingPropagator),
    TaskScheduler(TaskSchedulerPropagator),
}

macro_rules! dispatch {
    ($self:ident, $propagator:ident => $body:expr) => {
        match $self {
            PropagatorKind::LinearLessOrEqual($propagator) => $body,
            PropagatorKind::BinaryNotEquals($propagator) => $body,
            PropagatorKind::ReifiedEquality($propagator) => $body,
            PropagatorKind::Precedences($propagator) => $body,
            PropagatorKind::BinPacking($propagator) => $body,
            PropagatorKind::TaskScheduler($propagator) => $body,
        }
    };
}

impl Propagator for PropagatorKind {
    fn name(&self) -> &str {
        dispatch!(self, propagator => propagator.name())
    }

    fn propagate(&mut self, context: PropagationContextMut) -> PropagationStatus {
        dispatch!(self, propagator => propagator.propagate(context))
    }

    fn is_entailed(&self, context: PropagationContext) -> Entailment {
        dispatch!(self, propagator => propagator.is_entailed(context))
    }

    fn priority(&self) -> Priority {
        dispatch!(self, propagator => propagator.priority())
    }
}

macro_rules! impl_from_propagator {
    ($($variant:ident($propagator:ty)),+ $(,)?) => {
        $(
            impl From<$propagator> for PropagatorKind {
                fn from(propagator: $propagator) -> Self {
                    PropagatorKind::$variant(propagator)
                }
            }
        )+
    };
}

impl_from_propagator!(
    LinearLessOrEqual(LinearLessOrEqualPropagator),
    BinaryNotEquals(BinaryNotEqualsPropagator),
    ReifiedEquality(ReifiedEqualityPropagator),
    Precedences(PrecedencesPropagator),
    BinPacking(BinPackingPropagator),
    TaskScheduler(TaskSchedulerPropagator),
);
