//! The placement constraints an instance may carry.
//!
//! Every constraint is a plain struct describing the elements it involves. [`SatConstraint`] is
//! the closed set of constraints the scheduler understands; it exposes the checks that only need
//! a [`Model`], while posting on the reconfiguration problem happens inside the crate.
mod affinity;
mod capacity;
mod placement;
mod precedence;
mod state;

use std::collections::BTreeSet;

pub use affinity::*;
pub use capacity::*;
pub use placement::*;
pub use precedence::*;
pub use state::*;

use crate::model::Model;
use crate::model::Node;
use crate::model::Vm;
use crate::model::VmState;
use crate::problem::ReconfigurationProblem;
use crate::scheduler::SchedulerError;

/// The behaviour shared by every constraint.
pub(crate) trait PlacementConstraint {
    fn involved_vms(&self) -> Vec<Vm>;

    fn involved_nodes(&self) -> Vec<Node>;

    /// The states the constraint requires the VMs to reach.
    fn desired_vm_states(&self) -> Vec<(Vm, VmState)> {
        Vec::new()
    }

    /// The VMs which must be managed to satisfy the constraint from `model`.
    fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm>;

    fn is_satisfied(&self, model: &Model) -> bool;

    fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError>;

    /// Whether the constraint keeps its meaning when split among partitions.
    fn is_splittable(&self) -> bool {
        true
    }

    /// The constraint restricted to the elements of one partition; `None` if it does not
    /// constrain anything there.
    fn restrict(&self, vms: &BTreeSet<Vm>, nodes: &BTreeSet<Node>) -> Option<SatConstraint>;
}

/// A constraint of an instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SatConstraint {
    Running(Running),
    Ready(Ready),
    Sleeping(Sleeping),
    Killed(Killed),
    Online(Online),
    Offline(Offline),
    Ban(Ban),
    Fence(Fence),
    Root(Root),
    Spread(Spread),
    Gather(Gather),
    Lonely(Lonely),
    Split(Split),
    ResourceCapacity(ResourceCapacity),
    RunningCapacity(RunningCapacity),
    MaxOnline(MaxOnline),
    Precedence(Precedence),
}

macro_rules! dispatch {
    ($self:ident, $constraint:ident => $body:expr) => {
        match $self {
            SatConstraint::Running($constraint) => $body,
            SatConstraint::Ready($constraint) => $body,
            SatConstraint::Sleeping($constraint) => $body,
            SatConstraint::Killed($constraint) => $body,
            SatConstraint::Online($constraint) => $body,
            SatConstraint::Offline($constraint) => $body,
            SatConstraint::Ban($constraint) => $body,
            SatConstraint::Fence($constraint) => $body,
            SatConstraint::Root($constraint) => $body,
            SatConstraint::Spread($constraint) => $body,
            SatConstraint::Gather($constraint) => $body,
            SatConstraint::Lonely($constraint) => $body,
            SatConstraint::Split($constraint) => $body,
            SatConstraint::ResourceCapacity($constraint) => $body,
            SatConstraint::RunningCapacity($constraint) => $body,
            SatConstraint::MaxOnline($constraint) => $body,
            SatConstraint::Precedence($constraint) => $body,
        }
    };
}

impl SatConstraint {
    /// The VMs the constraint mentions.
    pub fn involved_vms(&self) -> Vec<Vm> {
        dispatch!(self, constraint => constraint.involved_vms())
    }

    /// The nodes the constraint mentions.
    pub fn involved_nodes(&self) -> Vec<Node> {
        dispatch!(self, constraint => constraint.involved_nodes())
    }

    /// The VMs that must be managed to satisfy the constraint from `model`; used in repair mode.
    pub fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm> {
        dispatch!(self, constraint => constraint.misplaced_vms(model))
    }

    /// Whether `model` satisfies the constraint.
    pub fn is_satisfied(&self, model: &Model) -> bool {
        dispatch!(self, constraint => constraint.is_satisfied(model))
    }

    pub(crate) fn desired_vm_states(&self) -> Vec<(Vm, VmState)> {
        dispatch!(self, constraint => constraint.desired_vm_states())
    }

    pub(crate) fn post(
        &self,
        problem: &mut ReconfigurationProblem<'_>,
    ) -> Result<(), SchedulerError> {
        dispatch!(self, constraint => constraint.post(problem))
    }

    pub(crate) fn is_splittable(&self) -> bool {
        dispatch!(self, constraint => constraint.is_splittable())
    }

    pub(crate) fn restrict(
        &self,
        vms: &BTreeSet<Vm>,
        nodes: &BTreeSet<Node>,
    ) -> Option<SatConstraint> {
        dispatch!(self, constraint => constraint.restrict(vms, nodes))
    }
}

macro_rules! impl_from_constraint {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for SatConstraint {
                fn from(constraint: $variant) -> Self {
                    SatConstraint::$variant(constraint)
                }
            }
        )+
    };
}

impl_from_constraint!(
    Running,
    Ready,
    Sleeping,
    Killed,
    Online,
    Offline,
    Ban,
    Fence,
    Root,
    Spread,
    Gather,
    Lonely,
    Split,
    ResourceCapacity,
    RunningCapacity,
    MaxOnline,
    Precedence,
);

/// The elements of `elements` which are in `kept`, in order.
fn retain<T: Ord + Copy>(elements: &[T], kept: &BTreeSet<T>) -> Vec<T> {
    elements
        .iter()
        .copied()
        .filter(|element| kept.contains(element))
        .collect()
}

/// The running VMs of `vms` in `model`, with their host.
fn running_hosts<'a>(
    model: &'a Model,
    vms: &'a [Vm],
) -> impl Iterator<Item = (Vm, Node)> + 'a {
    vms.iter().filter_map(move |&vm| {
        model
            .mapping()
            .is_running(vm)
            .then(|| model.mapping().vm_location(vm))
            .flatten()
            .map(|node| (vm, node))
    })
}
