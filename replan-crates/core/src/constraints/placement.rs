use std::collections::BTreeSet;

use super::retain;
use super::running_hosts;
use super::PlacementConstraint;
use super::SatConstraint;
use crate::engine::variables::DomainId;
use crate::model::Model;
use crate::model::Node;
use crate::model::Vm;
use crate::problem::ReconfigurationProblem;
use crate::problem::VmTransitionKind;
use crate::scheduler::SchedulerError;

/// The VMs must not run on any of the nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ban {
    pub vms: Vec<Vm>,
    pub nodes: Vec<Node>,
}

impl Ban {
    pub fn new(vms: impl IntoIterator<Item = Vm>, nodes: impl IntoIterator<Item = Node>) -> Ban {
        Ban {
            vms: vms.into_iter().collect(),
            nodes: nodes.into_iter().collect(),
        }
    }
}

impl PlacementConstraint for Ban {
    fn involved_vms(&self) -> Vec<Vm> {
        self.vms.clone()
    }

    fn involved_nodes(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm> {
        running_hosts(model, &self.vms)
            .filter(|(_, host)| self.nodes.contains(host))
            .map(|(vm, _)| vm)
            .collect()
    }

    fn is_satisfied(&self, model: &Model) -> bool {
        self.misplaced_vms(model).is_empty()
    }

    fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
        let banned = self
            .nodes
            .iter()
            .filter_map(|&node| problem.node_index(node))
            .collect::<Vec<_>>();
        let removals = hosts(problem, &self.vms)
            .flat_map(|host| banned.iter().map(move |&index| (host, index as i32)))
            .collect::<Vec<_>>();
        remove_hosts(problem, removals)
    }

    fn restrict(&self, vms: &BTreeSet<Vm>, nodes: &BTreeSet<Node>) -> Option<SatConstraint> {
        let vms = retain(&self.vms, vms);
        let nodes = retain(&self.nodes, nodes);
        (!vms.is_empty() && !nodes.is_empty()).then(|| Ban { vms, nodes }.into())
    }
}

/// The VMs may only run on the nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fence {
    pub vms: Vec<Vm>,
    pub nodes: Vec<Node>,
}

impl Fence {
    pub fn new(vms: impl IntoIterator<Item = Vm>, nodes: impl IntoIterator<Item = Node>) -> Fence {
        Fence {
            vms: vms.into_iter().collect(),
            nodes: nodes.into_iter().collect(),
        }
    }
}

impl PlacementConstraint for Fence {
    fn involved_vms(&self) -> Vec<Vm> {
        self.vms.clone()
    }

    fn involved_nodes(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm> {
        running_hosts(model, &self.vms)
            .filter(|(_, host)| !self.nodes.contains(host))
            .map(|(vm, _)| vm)
            .collect()
    }

    fn is_satisfied(&self, model: &Model) -> bool {
        self.misplaced_vms(model).is_empty()
    }

    fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
        let outside = problem
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| !self.nodes.contains(node))
            .map(|(index, _)| index as i32)
            .collect::<Vec<_>>();
        let removals = hosts(problem, &self.vms)
            .flat_map(|host| outside.iter().map(move |&index| (host, index)))
            .collect::<Vec<_>>();
        remove_hosts(problem, removals)
    }

    // A fence left without nodes in the partition still forbids the VMs to run there.
    fn restrict(&self, vms: &BTreeSet<Vm>, nodes: &BTreeSet<Node>) -> Option<SatConstraint> {
        let vms = retain(&self.vms, vms);
        let nodes = retain(&self.nodes, nodes);
        (!vms.is_empty()).then(|| Fence { vms, nodes }.into())
    }
}

/// The running VMs must not be migrated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Root {
    pub vms: Vec<Vm>,
}

impl Root {
    pub fn new(vms: impl IntoIterator<Item = Vm>) -> Root {
        Root {
            vms: vms.into_iter().collect(),
        }
    }
}

impl PlacementConstraint for Root {
    fn involved_vms(&self) -> Vec<Vm> {
        self.vms.clone()
    }

    fn involved_nodes(&self) -> Vec<Node> {
        Vec::new()
    }

    fn misplaced_vms(&self, _: &Model) -> BTreeSet<Vm> {
        BTreeSet::new()
    }

    // Only a plan tells whether a VM moved.
    fn is_satisfied(&self, _: &Model) -> bool {
        true
    }

    fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
        let pinned = self
            .vms
            .iter()
            .filter_map(|&vm| problem.vm_transition(vm))
            .filter(|transition| transition.kind == VmTransitionKind::Relocatable)
            .filter_map(|transition| Some((transition.host?, transition.source? as i32)))
            .collect::<Vec<_>>();
        problem.restrict(|context| {
            let mut changed = false;
            for &(host, source) in &pinned {
                changed |= context.instantiate(host, source)?;
            }
            Ok(changed)
        })
    }

    fn restrict(&self, vms: &BTreeSet<Vm>, _: &BTreeSet<Node>) -> Option<SatConstraint> {
        let vms = retain(&self.vms, vms);
        (!vms.is_empty()).then(|| Root { vms }.into())
    }
}

/// The host variables of the VMs of `vms` ending in the running state.
pub(super) fn hosts<'a>(
    problem: &'a ReconfigurationProblem<'_>,
    vms: &'a [Vm],
) -> impl Iterator<Item = DomainId> + 'a {
    vms.iter().filter_map(|&vm| problem.vm_host(vm))
}

fn remove_hosts(
    problem: &mut ReconfigurationProblem<'_>,
    removals: Vec<(DomainId, i32)>,
) -> Result<(), SchedulerError> {
    problem.restrict(|context| {
        let mut changed = false;
        for (host, index) in removals {
            changed |= context.remove(host, index)?;
        }
        Ok(changed)
    })
}
