//! The datacenter model the scheduler reads: elements, their placement, shared resources and
//! attributes.
mod attributes;
mod element;
mod mapping;
mod resource;

pub use attributes::*;
pub use element::*;
pub use mapping::*;
pub use resource::*;

/// A snapshot of a datacenter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Model {
    mapping: Mapping,
    resources: Vec<ShareableResource>,
    attributes: Attributes,
    next_node_id: u32,
    next_vm_id: u32,
}

impl Model {
    /// Create a fresh node identifier; the node is not added to the mapping.
    pub fn new_node(&mut self) -> Node {
        let node = Node::new(self.next_node_id);
        self.next_node_id += 1;
        node
    }

    /// Create a fresh VM identifier; the VM starts in the init state.
    pub fn new_vm(&mut self) -> Vm {
        let vm = Vm::new(self.next_vm_id);
        self.next_vm_id += 1;
        vm
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn mapping_mut(&mut self) -> &mut Mapping {
        &mut self.mapping
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    /// Attach a resource; one with the same name is replaced.
    pub fn add_resource(&mut self, resource: ShareableResource) {
        self.resources.retain(|other| other.name() != resource.name());
        self.resources.push(resource);
    }

    pub fn resource(&self, name: &str) -> Option<&ShareableResource> {
        self.resources.iter().find(|resource| resource.name() == name)
    }

    pub fn resource_mut(&mut self, name: &str) -> Option<&mut ShareableResource> {
        self.resources
            .iter_mut()
            .find(|resource| resource.name() == name)
    }

    pub fn resources(&self) -> &[ShareableResource] {
        &self.resources
    }

    /// A copy of this model restricted to `nodes` and the VMs they host, plus `vms`.
    ///
    /// Resources and attributes are shared unchanged.
    pub fn restrict_to(&self, nodes: &[Node], vms: &[Vm]) -> Model {
        let mut mapping = Mapping::default();
        for &node in nodes {
            match self.mapping.node_state(node) {
                Some(NodeState::Online) => mapping.add_online_node(node),
                Some(NodeState::Offline) => {
                    let _ = mapping.add_offline_node(node);
                }
                None => {}
            }
        }
        for &node in nodes {
            for vm in self.mapping.running_vms_on(node) {
                let _ = mapping.add_running_vm(vm, node);
            }
            for vm in self.mapping.sleeping_vms_on(node) {
                let _ = mapping.add_sleeping_vm(vm, node);
            }
        }
        for &vm in vms {
            if self.mapping.vm_state(vm) == VmState::Ready {
                mapping.add_ready_vm(vm);
            }
        }

        Model {
            mapping,
            resources: self.resources.clone(),
            attributes: self.attributes.clone(),
            next_node_id: self.next_node_id,
            next_vm_id: self.next_vm_id,
        }
    }
}
