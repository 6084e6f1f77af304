use std::collections::BTreeSet;

use super::retain;
use super::PlacementConstraint;
use super::SatConstraint;
use crate::engine::variables::DomainId;
use crate::model::Model;
use crate::model::Node;
use crate::model::Vm;
use crate::problem::PackingDimension;
use crate::problem::ReconfigurationProblem;
use crate::scheduler::ModelingError;
use crate::scheduler::SchedulerError;

/// Whether a capacity bounds every node on its own or the nodes together.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CapacityScope {
    #[default]
    PerNode,
    Cumulated,
}

/// Bounds the amount of a resource consumed by the running VMs of the nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceCapacity {
    pub nodes: Vec<Node>,
    pub resource: String,
    pub amount: i32,
    pub scope: CapacityScope,
}

impl ResourceCapacity {
    pub fn new(
        nodes: impl IntoIterator<Item = Node>,
        resource: impl Into<String>,
        amount: i32,
        scope: CapacityScope,
    ) -> ResourceCapacity {
        ResourceCapacity {
            nodes: nodes.into_iter().collect(),
            resource: resource.into(),
            amount,
            scope,
        }
    }

    fn usage(&self, model: &Model, node: Node) -> i64 {
        model.resource(&self.resource).map_or(0, |resource| {
            resource.sum_consumptions(model.mapping().running_vms_on(node))
        })
    }
}

impl PlacementConstraint for ResourceCapacity {
    fn involved_vms(&self) -> Vec<Vm> {
        Vec::new()
    }

    fn involved_nodes(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm> {
        overloaded(model, &self.nodes, self.amount, self.scope, |node| {
            self.usage(model, node)
        })
    }

    fn is_satisfied(&self, model: &Model) -> bool {
        is_within(&self.nodes, self.amount, self.scope, |node| {
            self.usage(model, node)
        })
    }

    fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
        let Some(dimension) = problem.resource_dimension(&self.resource) else {
            let message = format!("no resource named '{}'", self.resource);
            return Err(ModelingError::new(problem.model(), message).into());
        };
        let loads = loads_of(problem, dimension, &self.nodes);
        post_capacity(problem, loads, self.amount, self.scope)
    }

    fn is_splittable(&self) -> bool {
        self.scope == CapacityScope::PerNode
    }

    fn restrict(&self, _: &BTreeSet<Vm>, nodes: &BTreeSet<Node>) -> Option<SatConstraint> {
        let nodes = retain(&self.nodes, nodes);
        (!nodes.is_empty()).then(|| {
            ResourceCapacity {
                nodes,
                ..self.clone()
            }
            .into()
        })
    }
}

/// Bounds the number of VMs running on the nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunningCapacity {
    pub nodes: Vec<Node>,
    pub amount: i32,
    pub scope: CapacityScope,
}

impl RunningCapacity {
    pub fn new(
        nodes: impl IntoIterator<Item = Node>,
        amount: i32,
        scope: CapacityScope,
    ) -> RunningCapacity {
        RunningCapacity {
            nodes: nodes.into_iter().collect(),
            amount,
            scope,
        }
    }
}

fn running_count(model: &Model, node: Node) -> i64 {
    model.mapping().running_vms_on(node).count() as i64
}

impl PlacementConstraint for RunningCapacity {
    fn involved_vms(&self) -> Vec<Vm> {
        Vec::new()
    }

    fn involved_nodes(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm> {
        overloaded(model, &self.nodes, self.amount, self.scope, |node| {
            running_count(model, node)
        })
    }

    fn is_satisfied(&self, model: &Model) -> bool {
        is_within(&self.nodes, self.amount, self.scope, |node| {
            running_count(model, node)
        })
    }

    fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
        let loads = loads_of(problem, problem.running_vms_dimension(), &self.nodes);
        post_capacity(problem, loads, self.amount, self.scope)
    }

    fn is_splittable(&self) -> bool {
        self.scope == CapacityScope::PerNode
    }

    fn restrict(&self, _: &BTreeSet<Vm>, nodes: &BTreeSet<Node>) -> Option<SatConstraint> {
        let nodes = retain(&self.nodes, nodes);
        (!nodes.is_empty()).then(|| {
            RunningCapacity {
                nodes,
                ..self.clone()
            }
            .into()
        })
    }
}

/// Bounds the number of nodes online at the end of the reconfiguration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaxOnline {
    pub nodes: Vec<Node>,
    pub amount: i32,
}

impl MaxOnline {
    pub fn new(nodes: impl IntoIterator<Item = Node>, amount: i32) -> MaxOnline {
        MaxOnline {
            nodes: nodes.into_iter().collect(),
            amount,
        }
    }
}

impl PlacementConstraint for MaxOnline {
    fn involved_vms(&self) -> Vec<Vm> {
        Vec::new()
    }

    fn involved_nodes(&self) -> Vec<Node> {
        self.nodes.clone()
    }

    fn misplaced_vms(&self, _: &Model) -> BTreeSet<Vm> {
        BTreeSet::new()
    }

    fn is_satisfied(&self, model: &Model) -> bool {
        let online = self
            .nodes
            .iter()
            .filter(|&&node| model.mapping().is_online(node))
            .count();
        online as i64 <= i64::from(self.amount)
    }

    fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
        let mut terms = Vec::with_capacity(self.nodes.len());
        for &node in &self.nodes {
            let Some(online) = problem.node_online(node) else {
                let message = format!("unknown node {node}");
                return Err(ModelingError::new(problem.model(), message).into());
            };
            terms.push((1, online.domain_id()));
        }
        problem.post_linear_less_or_equal(terms, self.amount)
    }

    fn is_splittable(&self) -> bool {
        false
    }

    fn restrict(&self, _: &BTreeSet<Vm>, _: &BTreeSet<Node>) -> Option<SatConstraint> {
        Some(self.clone().into())
    }
}

/// The loads of `nodes` in `dimension`; nodes outside the problem have none.
fn loads_of(
    problem: &ReconfigurationProblem<'_>,
    dimension: &PackingDimension,
    nodes: &[Node],
) -> Vec<DomainId> {
    nodes
        .iter()
        .filter_map(|&node| problem.node_index(node))
        .map(|index| dimension.loads[index])
        .collect()
}

fn post_capacity(
    problem: &mut ReconfigurationProblem<'_>,
    loads: Vec<DomainId>,
    amount: i32,
    scope: CapacityScope,
) -> Result<(), SchedulerError> {
    match scope {
        CapacityScope::PerNode => problem.restrict(|context| {
            let mut changed = false;
            for &load in &loads {
                changed |= context.set_upper_bound(load, amount)?;
            }
            Ok(changed)
        }),
        CapacityScope::Cumulated => {
            let terms = loads.into_iter().map(|load| (1, load)).collect();
            problem.post_linear_less_or_equal(terms, amount)
        }
    }
}

fn is_within(
    nodes: &[Node],
    amount: i32,
    scope: CapacityScope,
    usage: impl Fn(Node) -> i64,
) -> bool {
    let amount = i64::from(amount);
    match scope {
        CapacityScope::PerNode => nodes.iter().all(|&node| usage(node) <= amount),
        CapacityScope::Cumulated => nodes.iter().map(|&node| usage(node)).sum::<i64>() <= amount,
    }
}

/// The running VMs of the nodes exceeding the capacity.
fn overloaded(
    model: &Model,
    nodes: &[Node],
    amount: i32,
    scope: CapacityScope,
    usage: impl Fn(Node) -> i64,
) -> BTreeSet<Vm> {
    let amount = i64::from(amount);
    let exceeding = match scope {
        CapacityScope::PerNode => nodes
            .iter()
            .copied()
            .filter(|&node| usage(node) > amount)
            .collect::<Vec<_>>(),
        CapacityScope::Cumulated => {
            if nodes.iter().map(|&node| usage(node)).sum::<i64>() > amount {
                nodes.to_vec()
            } else {
                Vec::new()
            }
        }
    };
    exceeding
        .into_iter()
        .flat_map(|node| model.mapping().running_vms_on(node))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShareableResource;

    fn loaded_model() -> (Model, Node, Node, Vec<Vm>) {
        let mut model = Model::default();
        let n0 = model.new_node();
        let n1 = model.new_node();
        model.mapping_mut().add_online_node(n0);
        model.mapping_mut().add_online_node(n1);
        let vms = (0..3).map(|_| model.new_vm()).collect::<Vec<_>>();
        assert!(model.mapping_mut().add_running_vm(vms[0], n0));
        assert!(model.mapping_mut().add_running_vm(vms[1], n0));
        assert!(model.mapping_mut().add_running_vm(vms[2], n1));
        model.add_resource(ShareableResource::new("cpu", 8, 3));
        (model, n0, n1, vms)
    }

    #[test]
    fn per_node_capacity_misplaces_vms_of_overloaded_nodes() {
        let (model, n0, n1, vms) = loaded_model();
        let capacity = ResourceCapacity::new([n0, n1], "cpu", 5, CapacityScope::PerNode);

        assert!(!capacity.is_satisfied(&model));
        assert_eq!(BTreeSet::from([vms[0], vms[1]]), capacity.misplaced_vms(&model));
    }

    #[test]
    fn cumulated_capacity_misplaces_every_vm_of_the_nodes() {
        let (model, n0, n1, vms) = loaded_model();

        let capacity = RunningCapacity::new([n0, n1], 2, CapacityScope::Cumulated);
        assert_eq!(BTreeSet::from_iter(vms), capacity.misplaced_vms(&model));
        assert!(RunningCapacity::new([n0, n1], 2, CapacityScope::PerNode).is_satisfied(&model));
    }

    #[test]
    fn max_online_counts_online_nodes() {
        let (mut model, n0, n1, _) = loaded_model();
        let n2 = model.new_node();
        assert!(model.mapping_mut().add_offline_node(n2));

        assert!(MaxOnline::new([n0, n1, n2], 2).is_satisfied(&model));
        assert!(!MaxOnline::new([n0, n1, n2], 1).is_satisfied(&model));
    }

    #[test]
    fn only_per_node_capacities_are_splittable() {
        assert!(RunningCapacity::new([], 1, CapacityScope::PerNode).is_splittable());
        assert!(!RunningCapacity::new([], 1, CapacityScope::Cumulated).is_splittable());
        assert!(!MaxOnline::new([], 1).is_splittable());
    }
}
