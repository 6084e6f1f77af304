use std::collections::BTreeSet;

use itertools::Itertools;

use super::placement::hosts;
use super::retain;
use super::running_hosts;
use super::PlacementConstraint;
use super::SatConstraint;
use crate::model::Model;
use crate::model::Node;
use crate::model::Vm;
use crate::problem::ReconfigurationProblem;
use crate::scheduler::SchedulerError;

/// The running VMs are hosted on pairwise distinct nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Spread {
    pub vms: Vec<Vm>,
}

impl Spread {
    pub fn new(vms: impl IntoIterator<Item = Vm>) -> Spread {
        Spread {
            vms: vms.into_iter().collect(),
        }
    }
}

impl PlacementConstraint for Spread {
    fn involved_vms(&self) -> Vec<Vm> {
        self.vms.clone()
    }

    fn involved_nodes(&self) -> Vec<Node> {
        Vec::new()
    }

    fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm> {
        let placements = running_hosts(model, &self.vms).collect::<Vec<_>>();
        placements
            .iter()
            .filter(|(vm, host)| {
                placements
                    .iter()
                    .any(|(other, other_host)| other != vm && other_host == host)
            })
            .map(|&(vm, _)| vm)
            .collect()
    }

    fn is_satisfied(&self, model: &Model) -> bool {
        running_hosts(model, &self.vms).map(|(_, host)| host).all_unique()
    }

    fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
        let hosts = hosts(problem, &self.vms).collect::<Vec<_>>();
        for (a, b) in hosts.into_iter().tuple_combinations() {
            problem.post_not_equal(a, b)?;
        }
        Ok(())
    }

    fn restrict(&self, vms: &BTreeSet<Vm>, _: &BTreeSet<Node>) -> Option<SatConstraint> {
        let vms = retain(&self.vms, vms);
        (vms.len() > 1).then(|| Spread { vms }.into())
    }
}

/// The running VMs are hosted on a single node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gather {
    pub vms: Vec<Vm>,
}

impl Gather {
    pub fn new(vms: impl IntoIterator<Item = Vm>) -> Gather {
        Gather {
            vms: vms.into_iter().collect(),
        }
    }
}

impl PlacementConstraint for Gather {
    fn involved_vms(&self) -> Vec<Vm> {
        self.vms.clone()
    }

    fn involved_nodes(&self) -> Vec<Node> {
        Vec::new()
    }

    fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm> {
        if self.is_satisfied(model) {
            BTreeSet::new()
        } else {
            running_hosts(model, &self.vms).map(|(vm, _)| vm).collect()
        }
    }

    fn is_satisfied(&self, model: &Model) -> bool {
        running_hosts(model, &self.vms)
            .map(|(_, host)| host)
            .all_equal()
    }

    fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
        let hosts = hosts(problem, &self.vms).collect::<Vec<_>>();
        for (&a, &b) in hosts.iter().tuple_windows() {
            problem.post_equal(a, b)?;
        }
        Ok(())
    }

    fn is_splittable(&self) -> bool {
        false
    }

    fn restrict(&self, _: &BTreeSet<Vm>, _: &BTreeSet<Node>) -> Option<SatConstraint> {
        Some(self.clone().into())
    }
}

/// The running VMs share their hosts with no other VM.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lonely {
    pub vms: Vec<Vm>,
}

impl Lonely {
    pub fn new(vms: impl IntoIterator<Item = Vm>) -> Lonely {
        Lonely {
            vms: vms.into_iter().collect(),
        }
    }
}

impl PlacementConstraint for Lonely {
    fn involved_vms(&self) -> Vec<Vm> {
        self.vms.clone()
    }

    fn involved_nodes(&self) -> Vec<Node> {
        Vec::new()
    }

    fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm> {
        running_hosts(model, &self.vms)
            .filter(|&(_, host)| {
                model
                    .mapping()
                    .running_vms_on(host)
                    .any(|other| !self.vms.contains(&other))
            })
            .map(|(vm, _)| vm)
            .collect()
    }

    fn is_satisfied(&self, model: &Model) -> bool {
        self.misplaced_vms(model).is_empty()
    }

    fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
        let lonely = hosts(problem, &self.vms).collect::<Vec<_>>();
        let others = problem
            .items()
            .filter(|item| !self.vms.contains(&item.vm))
            .filter_map(|item| item.host)
            .collect::<Vec<_>>();
        for (&a, &b) in lonely.iter().cartesian_product(&others) {
            problem.post_not_equal(a, b)?;
        }
        Ok(())
    }

    fn restrict(&self, vms: &BTreeSet<Vm>, _: &BTreeSet<Node>) -> Option<SatConstraint> {
        let vms = retain(&self.vms, vms);
        (!vms.is_empty()).then(|| Lonely { vms }.into())
    }
}

/// The running VMs of distinct groups never share a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Split {
    pub groups: Vec<Vec<Vm>>,
}

impl Split {
    pub fn new(groups: impl IntoIterator<Item = Vec<Vm>>) -> Split {
        Split {
            groups: groups.into_iter().collect(),
        }
    }

    fn group_hosts(&self, model: &Model) -> Vec<BTreeSet<Node>> {
        self.groups
            .iter()
            .map(|group| running_hosts(model, group).map(|(_, host)| host).collect())
            .collect()
    }
}

impl PlacementConstraint for Split {
    fn involved_vms(&self) -> Vec<Vm> {
        self.groups.iter().flatten().copied().collect()
    }

    fn involved_nodes(&self) -> Vec<Node> {
        Vec::new()
    }

    fn misplaced_vms(&self, model: &Model) -> BTreeSet<Vm> {
        let group_hosts = &self.group_hosts(model);
        self.groups
            .iter()
            .enumerate()
            .flat_map(move |(index, group)| {
                running_hosts(model, group)
                    .filter(move |(_, host)| {
                        group_hosts
                            .iter()
                            .enumerate()
                            .any(|(other, hosts)| other != index && hosts.contains(host))
                    })
                    .map(|(vm, _)| vm)
            })
            .collect()
    }

    fn is_satisfied(&self, model: &Model) -> bool {
        self.group_hosts(model)
            .iter()
            .tuple_combinations()
            .all(|(a, b)| a.is_disjoint(b))
    }

    fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
        let group_hosts = self
            .groups
            .iter()
            .map(|group| hosts(problem, group).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        for (first, second) in group_hosts.iter().tuple_combinations() {
            for (&a, &b) in first.iter().cartesian_product(second) {
                problem.post_not_equal(a, b)?;
            }
        }
        Ok(())
    }

    fn restrict(&self, vms: &BTreeSet<Vm>, _: &BTreeSet<Node>) -> Option<SatConstraint> {
        let groups = self
            .groups
            .iter()
            .map(|group| retain(group, vms))
            .filter(|group| !group.is_empty())
            .collect::<Vec<_>>();
        (groups.len() > 1).then(|| Split { groups }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Three online nodes; `placement[i]` is the node index of the i-th VM.
    fn model_with(placement: &[usize]) -> (Model, Vec<Vm>) {
        let mut model = Model::default();
        let nodes = (0..3).map(|_| model.new_node()).collect::<Vec<_>>();
        for &node in &nodes {
            model.mapping_mut().add_online_node(node);
        }
        let vms = placement
            .iter()
            .map(|&index| {
                let vm = model.new_vm();
                assert!(model.mapping_mut().add_running_vm(vm, nodes[index]));
                vm
            })
            .collect();
        (model, vms)
    }

    #[test]
    fn spread_misplaces_colocated_vms() {
        let (model, vms) = model_with(&[0, 0, 1]);
        let spread = Spread::new(vms.clone());

        assert!(!spread.is_satisfied(&model));
        assert_eq!(BTreeSet::from([vms[0], vms[1]]), spread.misplaced_vms(&model));
        assert!(Spread::new([vms[1], vms[2]]).is_satisfied(&model));
    }

    #[test]
    fn gather_misplaces_every_vm_when_scattered() {
        let (model, vms) = model_with(&[0, 1]);

        assert_eq!(
            BTreeSet::from([vms[0], vms[1]]),
            Gather::new(vms.clone()).misplaced_vms(&model)
        );
        let (model, vms) = model_with(&[2, 2]);
        assert!(Gather::new(vms).is_satisfied(&model));
    }

    #[test]
    fn lonely_misplaces_vms_sharing_a_host_with_strangers() {
        let (model, vms) = model_with(&[0, 0, 1]);

        assert_eq!(BTreeSet::from([vms[0]]), Lonely::new([vms[0]]).misplaced_vms(&model));
        assert!(Lonely::new([vms[0], vms[1]]).is_satisfied(&model));
        assert!(Lonely::new([vms[2]]).is_satisfied(&model));
    }

    #[test]
    fn split_misplaces_vms_sharing_a_host_with_another_group() {
        let (model, vms) = model_with(&[0, 1, 1, 2]);
        let split = Split::new([vec![vms[0], vms[1]], vec![vms[2], vms[3]]]);

        assert!(!split.is_satisfied(&model));
        assert_eq!(BTreeSet::from([vms[1], vms[2]]), split.misplaced_vms(&model));
    }

    #[test]
    fn split_restricted_to_a_single_group_vanishes() {
        let split = Split::new([vec![Vm::new(0)], vec![Vm::new(1)]]);

        assert_eq!(None, split.restrict(&BTreeSet::from([Vm::new(0)]), &BTreeSet::new()));
        assert!(split
            .restrict(&BTreeSet::from([Vm::new(0), Vm::new(1)]), &BTreeSet::new())
            .is_some());
    }
}
