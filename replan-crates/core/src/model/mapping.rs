use std::collections::BTreeMap;
use std::collections::BTreeSet;

use super::Node;
use super::Vm;

/// The state of a VM.
///
/// A VM which is not in a [`Mapping`] is in the [`VmState::Init`] state; [`VmState::Killed`] only
/// appears as the desired state of a VM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VmState {
    Init,
    Ready,
    Running,
    Sleeping,
    Killed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeState {
    Online,
    Offline,
}

/// The placement of the VMs on the nodes and the state of every element.
///
/// Every node is either online or offline. A VM is at most in one of the running, sleeping and
/// ready sets; running and sleeping VMs are hosted on a node, and only online nodes host running
/// VMs. All iterators yield elements in identifier order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mapping {
    online: BTreeSet<Node>,
    offline: BTreeSet<Node>,
    running: BTreeMap<Vm, Node>,
    sleeping: BTreeMap<Vm, Node>,
    ready: BTreeSet<Vm>,
}

impl Mapping {
    /// Set `node` online.
    pub fn add_online_node(&mut self, node: Node) {
        let _ = self.offline.remove(&node);
        let _ = self.online.insert(node);
    }

    /// Set `node` offline. Fails if it hosts any VM.
    pub fn add_offline_node(&mut self, node: Node) -> bool {
        if self.hosts_vms(node) {
            return false;
        }
        let _ = self.online.remove(&node);
        let _ = self.offline.insert(node);
        true
    }

    /// Set `vm` running on `node`. Fails if `node` is not online.
    pub fn add_running_vm(&mut self, vm: Vm, node: Node) -> bool {
        if !self.online.contains(&node) {
            return false;
        }
        let _ = self.remove_vm(vm);
        let _ = self.running.insert(vm, node);
        true
    }

    /// Set `vm` sleeping on `node`. Fails if `node` is not online.
    pub fn add_sleeping_vm(&mut self, vm: Vm, node: Node) -> bool {
        if !self.online.contains(&node) {
            return false;
        }
        let _ = self.remove_vm(vm);
        let _ = self.sleeping.insert(vm, node);
        true
    }

    pub fn add_ready_vm(&mut self, vm: Vm) {
        let _ = self.remove_vm(vm);
        let _ = self.ready.insert(vm);
    }

    /// Remove `vm` from the mapping, putting it back in the init state.
    pub fn remove_vm(&mut self, vm: Vm) -> bool {
        self.running.remove(&vm).is_some()
            || self.sleeping.remove(&vm).is_some()
            || self.ready.remove(&vm)
    }

    /// Remove `node` from the mapping. Fails if it hosts any VM.
    pub fn remove_node(&mut self, node: Node) -> bool {
        if self.hosts_vms(node) {
            return false;
        }
        self.online.remove(&node) || self.offline.remove(&node)
    }

    pub fn vm_state(&self, vm: Vm) -> VmState {
        if self.running.contains_key(&vm) {
            VmState::Running
        } else if self.sleeping.contains_key(&vm) {
            VmState::Sleeping
        } else if self.ready.contains(&vm) {
            VmState::Ready
        } else {
            VmState::Init
        }
    }

    pub fn node_state(&self, node: Node) -> Option<NodeState> {
        if self.online.contains(&node) {
            Some(NodeState::Online)
        } else if self.offline.contains(&node) {
            Some(NodeState::Offline)
        } else {
            None
        }
    }

    /// The node hosting `vm`, if it is running or sleeping.
    pub fn vm_location(&self, vm: Vm) -> Option<Node> {
        self.running
            .get(&vm)
            .or_else(|| self.sleeping.get(&vm))
            .copied()
    }

    pub fn contains_vm(&self, vm: Vm) -> bool {
        self.vm_state(vm) != VmState::Init
    }

    pub fn contains_node(&self, node: Node) -> bool {
        self.node_state(node).is_some()
    }

    pub fn is_online(&self, node: Node) -> bool {
        self.online.contains(&node)
    }

    pub fn is_running(&self, vm: Vm) -> bool {
        self.running.contains_key(&vm)
    }

    pub fn online_nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.online.iter().copied()
    }

    pub fn offline_nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.offline.iter().copied()
    }

    /// All the nodes, online and offline, in identifier order.
    pub fn all_nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.online.union(&self.offline).copied()
    }

    pub fn running_vms(&self) -> impl Iterator<Item = Vm> + '_ {
        self.running.keys().copied()
    }

    pub fn sleeping_vms(&self) -> impl Iterator<Item = Vm> + '_ {
        self.sleeping.keys().copied()
    }

    pub fn ready_vms(&self) -> impl Iterator<Item = Vm> + '_ {
        self.ready.iter().copied()
    }

    /// All the VMs in the mapping, in identifier order.
    pub fn all_vms(&self) -> impl Iterator<Item = Vm> + '_ {
        let mut vms = self
            .running_vms()
            .chain(self.sleeping_vms())
            .chain(self.ready_vms())
            .collect::<Vec<_>>();
        vms.sort_unstable();
        vms.into_iter()
    }

    pub fn running_vms_on(&self, node: Node) -> impl Iterator<Item = Vm> + '_ {
        self.running
            .iter()
            .filter(move |&(_, &host)| host == node)
            .map(|(&vm, _)| vm)
    }

    pub fn sleeping_vms_on(&self, node: Node) -> impl Iterator<Item = Vm> + '_ {
        self.sleeping
            .iter()
            .filter(move |&(_, &host)| host == node)
            .map(|(&vm, _)| vm)
    }

    pub fn num_nodes(&self) -> usize {
        self.online.len() + self.offline.len()
    }

    pub fn num_vms(&self) -> usize {
        self.running.len() + self.sleeping.len() + self.ready.len()
    }

    fn hosts_vms(&self, node: Node) -> bool {
        self.running.values().chain(self.sleeping.values()).any(|&host| host == node)
    }
}
