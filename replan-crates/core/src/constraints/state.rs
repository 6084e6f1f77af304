use std::collections::BTreeSet;

use super::retain;
use super::PlacementConstraint;
use super::SatConstraint;
use crate::model::Model;
use crate::model::Node;
use crate::model::NodeState;
use crate::model::Vm;
use crate::model::VmState;
use crate::problem::ReconfigurationProblem;
use crate::scheduler::ModelingError;
use crate::scheduler::SchedulerError;

macro_rules! vm_state_constraint {
    ($(#[$documentation:meta])* $name:ident, $state:expr) => {
        $(#[$documentation])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            pub vms: Vec<Vm>,
        }

        impl $name {
            pub fn new(vms: impl IntoIterator<Item = Vm>) -> $name {
                $name {
                    vms: vms.into_iter().collect(),
                }
            }
        }

        impl PlacementConstraint for $name {
            fn involved_vms(&self) -> Vec<Vm> {
                self.vms.clone()
            }

            fn involved_nodes(&self) -> Vec<Node> {
                Vec::new()
            }

            fn desired_vm_states(&self) -> Vec<(Vm, VmState)> {
                self.vms.iter().map(|&vm| (vm, $state)).collect()
            }

            fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm> {
                self.vms
                    .iter()
                    .copied()
                    .filter(|&vm| model.mapping().vm_state(vm) != expected_state($state))
                    .collect()
            }

            fn is_satisfied(&self, model: &Model) -> bool {
                self.misplaced_vms(model).is_empty()
            }

            // The state is enforced by the choice of the transitions.
            fn post(&self, _: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
                Ok(())
            }

            fn restrict(
                &self,
                vms: &BTreeSet<Vm>,
                _: &BTreeSet<Node>,
            ) -> Option<SatConstraint> {
                let vms = retain(&self.vms, vms);
                (!vms.is_empty()).then(|| $name { vms }.into())
            }
        }
    };
}

/// A killed VM leaves the mapping.
fn expected_state(state: VmState) -> VmState {
    match state {
        VmState::Killed => VmState::Init,
        state => state,
    }
}

vm_state_constraint!(
    /// The VMs are running at the end of the reconfiguration.
    Running,
    VmState::Running
);
vm_state_constraint!(
    /// The VMs are ready at the end of the reconfiguration.
    Ready,
    VmState::Ready
);
vm_state_constraint!(
    /// The VMs are sleeping at the end of the reconfiguration.
    Sleeping,
    VmState::Sleeping
);
vm_state_constraint!(
    /// The VMs are killed during the reconfiguration.
    Killed,
    VmState::Killed
);

macro_rules! node_state_constraint {
    ($(#[$documentation:meta])* $name:ident, $state:expr) => {
        $(#[$documentation])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            pub nodes: Vec<Node>,
        }

        impl $name {
            pub fn new(nodes: impl IntoIterator<Item = Node>) -> $name {
                $name {
                    nodes: nodes.into_iter().collect(),
                }
            }
        }

        impl PlacementConstraint for $name {
            fn involved_vms(&self) -> Vec<Vm> {
                Vec::new()
            }

            fn involved_nodes(&self) -> Vec<Node> {
                self.nodes.clone()
            }

            fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm> {
                if $state == NodeState::Online {
                    return BTreeSet::new();
                }
                self.nodes
                    .iter()
                    .flat_map(|&node| model.mapping().running_vms_on(node))
                    .collect()
            }

            fn is_satisfied(&self, model: &Model) -> bool {
                self.nodes
                    .iter()
                    .all(|&node| model.mapping().node_state(node) == Some($state))
            }

            fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
                for &node in &self.nodes {
                    let Some(online) = problem.node_online(node) else {
                        let message = format!("unknown node {node}");
                        return Err(ModelingError::new(problem.model(), message).into());
                    };
                    let value = $state == NodeState::Online;
                    problem.restrict(|context| context.set_literal(online, value))?;
                }
                Ok(())
            }

            fn restrict(
                &self,
                _: &BTreeSet<Vm>,
                nodes: &BTreeSet<Node>,
            ) -> Option<SatConstraint> {
                let nodes = retain(&self.nodes, nodes);
                (!nodes.is_empty()).then(|| $name { nodes }.into())
            }
        }
    };
}

node_state_constraint!(
    /// The nodes are online at the end of the reconfiguration.
    Online,
    NodeState::Online
);
node_state_constraint!(
    /// The nodes are offline at the end of the reconfiguration.
    Offline,
    NodeState::Offline
);
