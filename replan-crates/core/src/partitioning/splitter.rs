use std::collections::BTreeMap;
use std::collections::BTreeSet;

use itertools::Itertools;
use log::debug;

use super::PartitioningStrategy;
use super::UnionFind;
use crate::constraints::SatConstraint;
use crate::containers::HashMap;
use crate::model::Model;
use crate::model::Node;
use crate::model::Vm;
use crate::model::VmState;
use crate::problem::future_vm_states;
use crate::problem::managed_vms;
use crate::scheduler::Instance;
use crate::scheduler::ModelingError;
use crate::scheduler::SchedulerError;

/// A part of an instance which can be solved on its own.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Partition {
    pub(crate) nodes: Vec<Node>,
    /// The VMs hosted by the nodes, then the VMs hosted nowhere.
    pub(crate) vms: Vec<Vm>,
    pub(crate) constraints: Vec<SatConstraint>,
}

/// Split `instance` into independent partitions.
///
/// The nodes are split according to `strategy`; a VM belongs to the partition of its host. A VM
/// which may move merges the partitions of every node it may end up on, so that no partition
/// loses a plan of the whole instance. The constraints spanning several partitions are either
/// split into one constraint per partition, or merge the partitions they touch.
pub(crate) fn split(
    instance: &Instance,
    strategy: &impl PartitioningStrategy,
    repair: bool,
) -> Result<Vec<Partition>, SchedulerError> {
    let model = &instance.model;
    let mut node_sets = strategy.node_sets(model)?;
    if node_sets.is_empty() {
        node_sets.push(Vec::new());
    }
    let node_partitions = index_nodes(model, &node_sets)?;
    let candidates = candidate_hosts(instance, repair)?;

    let mut vm_partitions: HashMap<_, _> = HashMap::default();
    for vm in model.mapping().all_vms() {
        if let Some(node) = model.mapping().vm_location(vm) {
            let _ = vm_partitions.insert(vm, node_partitions[&node]);
        }
    }

    let mut sets = UnionFind::new(node_sets.len());
    let unplaced = model
        .mapping()
        .ready_vms()
        .chain(instance.constraints.iter().flat_map(SatConstraint::involved_vms))
        .filter(|vm| !vm_partitions.contains_key(vm))
        .collect::<BTreeSet<_>>();
    for (position, &vm) in unplaced.iter().enumerate() {
        // A VM hosted nowhere goes with its first candidate host, or is dealt in turn.
        let partition = candidates
            .get(&vm)
            .and_then(|hosts| hosts.first())
            .and_then(|node| node_partitions.get(node).copied())
            .unwrap_or(position % sets.len());
        let _ = vm_partitions.insert(vm, partition);
    }

    for (vm, hosts) in &candidates {
        if let Some(&partition) = vm_partitions.get(vm) {
            sets.union_all(
                std::iter::once(partition)
                    .chain(hosts.iter().filter_map(|node| node_partitions.get(node).copied())),
            );
        }
    }

    let touched = |constraint: &SatConstraint| {
        constraint
            .involved_vms()
            .into_iter()
            .filter_map(|vm| vm_partitions.get(&vm).copied())
            .chain(
                constraint
                    .involved_nodes()
                    .into_iter()
                    .filter_map(|node| node_partitions.get(&node).copied()),
            )
            .collect::<BTreeSet<_>>()
    };
    for constraint in &instance.constraints {
        if !constraint.is_splittable() {
            sets.union_all(touched(constraint));
        }
    }

    // Number the merged partitions in the order of their first node set.
    let mut numbering: HashMap<_, _> = HashMap::default();
    for set in 0..node_sets.len() {
        let root = sets.find(set);
        let next = numbering.len();
        let _ = numbering.entry(root).or_insert(next);
    }
    let mut partitions = vec![
        Partition {
            nodes: Vec::new(),
            vms: Vec::new(),
            constraints: Vec::new(),
        };
        numbering.len()
    ];
    let final_partition = |sets: &mut UnionFind, set: usize| numbering[&sets.find(set)];
    for (set, nodes) in node_sets.into_iter().enumerate() {
        let partition = final_partition(&mut sets, set);
        for &node in &nodes {
            partitions[partition]
                .vms
                .extend(model.mapping().running_vms_on(node));
            partitions[partition]
                .vms
                .extend(model.mapping().sleeping_vms_on(node));
        }
        partitions[partition].nodes.extend(nodes);
    }
    for &vm in &unplaced {
        let partition = final_partition(&mut sets, vm_partitions[&vm]);
        partitions[partition].vms.push(vm);
    }

    let members = partitions
        .iter()
        .map(|partition| {
            (
                partition.vms.iter().copied().collect::<BTreeSet<_>>(),
                partition.nodes.iter().copied().collect::<BTreeSet<_>>(),
            )
        })
        .collect::<Vec<_>>();
    for constraint in &instance.constraints {
        let targets = touched(constraint)
            .into_iter()
            .map(|set| final_partition(&mut sets, set))
            .unique()
            .collect::<Vec<_>>();
        if targets.is_empty() {
            // Unknown elements only; the first partition reports them.
            partitions[0].constraints.push(constraint.clone());
            continue;
        }
        for partition in targets {
            let (vms, nodes) = &members[partition];
            if let Some(restricted) = constraint.restrict(vms, nodes) {
                partitions[partition].constraints.push(restricted);
            }
        }
    }

    debug!(
        "{} partitions of sizes {:?}",
        partitions.len(),
        partitions
            .iter()
            .map(|partition| partition.nodes.len())
            .collect::<Vec<_>>()
    );
    Ok(partitions)
}

/// The nodes each VM which may be placed anew can run on at the end of the reconfiguration.
///
/// These are the managed VMs ending in the running state; their hosts are narrowed by the `ban`,
/// `fence` and `root` constraints.
fn candidate_hosts(
    instance: &Instance,
    repair: bool,
) -> Result<BTreeMap<Vm, BTreeSet<Node>>, SchedulerError> {
    let model = &instance.model;
    let future_states = future_vm_states(model, &instance.constraints)?;
    let mut candidates = managed_vms(model, &instance.constraints, &future_states, repair)
        .into_iter()
        .filter(|vm| future_states.get(vm) == Some(&VmState::Running))
        .map(|vm| (vm, model.mapping().all_nodes().collect::<BTreeSet<_>>()))
        .collect::<BTreeMap<_, _>>();

    for constraint in &instance.constraints {
        match constraint {
            SatConstraint::Ban(ban) => {
                narrow(&mut candidates, &ban.vms, |_, node| !ban.nodes.contains(&node));
            }
            SatConstraint::Fence(fence) => {
                narrow(&mut candidates, &fence.vms, |_, node| fence.nodes.contains(&node));
            }
            SatConstraint::Root(root) => narrow(&mut candidates, &root.vms, |vm, node| {
                !model.mapping().is_running(vm) || model.mapping().vm_location(vm) == Some(node)
            }),
            _ => {}
        }
    }
    Ok(candidates)
}

fn narrow(
    candidates: &mut BTreeMap<Vm, BTreeSet<Node>>,
    vms: &[Vm],
    kept: impl Fn(Vm, Node) -> bool,
) {
    for &vm in vms {
        if let Some(hosts) = candidates.get_mut(&vm) {
            hosts.retain(|&node| kept(vm, node));
        }
    }
}

/// The partition of every node, checking that the node sets are a partition of the model.
fn index_nodes(
    model: &Model,
    node_sets: &[Vec<Node>],
) -> Result<HashMap<Node, usize>, ModelingError> {
    let mut node_partitions = HashMap::default();
    for (set, nodes) in node_sets.iter().enumerate() {
        for &node in nodes {
            if !model.mapping().contains_node(node) {
                return Err(ModelingError::new(model, format!("unknown node {node}")));
            }
            if node_partitions.insert(node, set).is_some() {
                let message = format!("{node} belongs to several partitions");
                return Err(ModelingError::new(model, message));
            }
        }
    }
    if let Some(node) = model
        .mapping()
        .all_nodes()
        .find(|node| !node_partitions.contains_key(node))
    {
        return Err(ModelingError::new(model, format!("{node} belongs to no partition")));
    }
    Ok(node_partitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Ban;
    use crate::constraints::Fence;
    use crate::constraints::Precedence;
    use crate::constraints::Running;
    use crate::constraints::Spread;
    use crate::partitioning::AutoPartitioning;
    use crate::partitioning::FixedNodeSetsPartitioning;

    /// Three online nodes, each hosting one running VM.
    fn three_hosts() -> (Model, Vec<Node>, Vec<Vm>) {
        let mut model = Model::default();
        let nodes = (0..3).map(|_| model.new_node()).collect::<Vec<_>>();
        let vms = nodes
            .iter()
            .map(|&node| {
                model.mapping_mut().add_online_node(node);
                let vm = model.new_vm();
                assert!(model.mapping_mut().add_running_vm(vm, node));
                vm
            })
            .collect::<Vec<_>>();
        (model, nodes, vms)
    }

    #[test]
    fn splittable_constraints_are_restricted_to_each_partition() {
        let (model, _, vms) = three_hosts();
        let instance = Instance::new(model, [Spread::new(vms.clone()).into()]);

        let partitions = split(&instance, &AutoPartitioning, true).expect("valid partitioning");
        assert_eq!(3, partitions.len());
        assert!(partitions
            .iter()
            .all(|partition| partition.constraints.is_empty()));

        let instance = Instance::new(instance.model, [Running::new(vms.clone()).into()]);
        let partitions = split(&instance, &AutoPartitioning, true).expect("valid partitioning");
        for (partition, &vm) in partitions.iter().zip(&vms) {
            assert_eq!(vec![SatConstraint::from(Running::new([vm]))], partition.constraints);
        }
    }

    #[test]
    fn merging_constraints_merge_the_partitions_they_touch() {
        let (model, nodes, vms) = three_hosts();
        let instance = Instance::new(model, [Precedence::new(vms[0], vms[2]).into()]);

        let partitions = split(&instance, &AutoPartitioning, true).expect("valid partitioning");
        assert_eq!(2, partitions.len());
        assert_eq!(vec![nodes[0], nodes[2]], partitions[0].nodes);
        assert_eq!(vec![vms[0], vms[2]], partitions[0].vms);
        assert_eq!(1, partitions[0].constraints.len());
        assert_eq!(vec![nodes[1]], partitions[1].nodes);
    }

    #[test]
    fn a_vm_that_must_move_merges_the_partitions_of_its_candidate_hosts() {
        let (model, nodes, vms) = three_hosts();
        let instance = Instance::new(model, [Ban::new([vms[0]], [nodes[0]]).into()]);

        let partitions = split(&instance, &AutoPartitioning, true).expect("valid partitioning");
        assert_eq!(1, partitions.len());
        assert_eq!(nodes, partitions[0].nodes);
    }

    #[test]
    fn a_fence_keeps_a_moving_vm_within_its_nodes() {
        let (model, nodes, vms) = three_hosts();
        let instance = Instance::new(
            model,
            [
                Ban::new([vms[0]], [nodes[0]]).into(),
                Fence::new([vms[0]], [nodes[0], nodes[1]]).into(),
            ],
        );

        let partitions = split(&instance, &AutoPartitioning, true).expect("valid partitioning");
        assert_eq!(2, partitions.len());
        assert_eq!(vec![nodes[0], nodes[1]], partitions[0].nodes);
        assert_eq!(vec![nodes[2]], partitions[1].nodes);
    }

    #[test]
    fn without_repair_every_running_vm_may_move_anywhere() {
        let (model, _, vms) = three_hosts();
        let instance = Instance::new(model, []);

        let partitions = split(&instance, &AutoPartitioning, false).expect("valid partitioning");
        assert_eq!(1, partitions.len());
        assert_eq!(vms, partitions[0].vms);
    }

    #[test]
    fn ready_vms_follow_their_fence() {
        let (mut model, nodes, _) = three_hosts();
        let ready = model.new_vm();
        model.mapping_mut().add_ready_vm(ready);
        let instance = Instance::new(
            model,
            [
                Running::new([ready]).into(),
                Fence::new([ready], [nodes[1]]).into(),
            ],
        );

        let partitions = split(&instance, &AutoPartitioning, true).expect("valid partitioning");
        assert_eq!(3, partitions.len());
        assert!(partitions[1].vms.contains(&ready));
        assert_eq!(2, partitions[1].constraints.len());
    }

    #[test]
    fn unfenced_ready_vms_merge_every_automatic_partition() {
        let (mut model, _, _) = three_hosts();
        let ready = model.new_vm();
        model.mapping_mut().add_ready_vm(ready);
        let instance = Instance::new(model, [Running::new([ready]).into()]);

        let partitions = split(&instance, &AutoPartitioning, true).expect("valid partitioning");
        assert_eq!(1, partitions.len());
        assert_eq!(4, partitions[0].vms.len());
    }

    #[test]
    fn overlapping_node_sets_are_rejected() {
        let (model, nodes, _) = three_hosts();
        let instance = Instance::new(model, []);
        let strategy = FixedNodeSetsPartitioning::new(vec![
            vec![nodes[0], nodes[1]],
            vec![nodes[1], nodes[2]],
        ]);

        assert!(split(&instance, &strategy, true).is_err());
    }

    #[test]
    fn unfenced_ready_vms_are_dealt_round_robin() {
        let (mut model, nodes, _) = three_hosts();
        let ready = [model.new_vm(), model.new_vm()];
        for vm in ready {
            model.mapping_mut().add_ready_vm(vm);
        }
        let instance = Instance::new(model, []);
        let strategy =
            FixedNodeSetsPartitioning::new(vec![vec![nodes[0]], vec![nodes[1], nodes[2]]]);

        let partitions = split(&instance, &strategy, true).expect("valid partitioning");
        assert_eq!(Some(&ready[0]), partitions[0].vms.last());
        assert_eq!(Some(&ready[1]), partitions[1].vms.last());
    }
}
