use std::fmt::Display;

use enum_map::Enum;

use crate::model::Element;
use crate::model::Model;
use crate::model::Node;
use crate::model::NodeState;
use crate::model::Vm;
use crate::model::VmState;

/// The kinds of actions a plan is made of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Enum)]
pub enum ActionType {
    MigrateVm,
    BootVm,
    ShutdownVm,
    SuspendVm,
    ResumeVm,
    KillVm,
    ForgeVm,
    Allocate,
    BootNode,
    ShutdownNode,
}

impl ActionType {
    /// The attribute holding the expected duration of this kind of action on an element.
    pub fn attribute_key(&self) -> &'static str {
        match self {
            ActionType::MigrateVm => "migrate",
            ActionType::BootVm | ActionType::BootNode => "boot",
            ActionType::ShutdownVm | ActionType::ShutdownNode => "shutdown",
            ActionType::SuspendVm => "suspend",
            ActionType::ResumeVm => "resume",
            ActionType::KillVm => "kill",
            ActionType::ForgeVm => "forge",
            ActionType::Allocate => "allocate",
        }
    }
}

/// What an action does, with the elements it involves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    MigrateVm { vm: Vm, src: Node, dst: Node },
    BootVm { vm: Vm, dst: Node },
    ShutdownVm { vm: Vm, src: Node },
    SuspendVm { vm: Vm, src: Node, dst: Node },
    ResumeVm { vm: Vm, src: Node, dst: Node },
    KillVm { vm: Vm, host: Option<Node> },
    ForgeVm { vm: Vm },
    Allocate {
        vm: Vm,
        host: Node,
        resource: String,
        amount: i32,
    },
    BootNode { node: Node },
    ShutdownNode { node: Node },
}

/// An action of a reconfiguration plan, running in the interval `[start, end]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub start: i32,
    pub end: i32,
}

impl Action {
    pub fn new(kind: ActionKind, start: i32, end: i32) -> Action {
        Action { kind, start, end }
    }

    pub fn action_type(&self) -> ActionType {
        match self.kind {
            ActionKind::MigrateVm { .. } => ActionType::MigrateVm,
            ActionKind::BootVm { .. } => ActionType::BootVm,
            ActionKind::ShutdownVm { .. } => ActionType::ShutdownVm,
            ActionKind::SuspendVm { .. } => ActionType::SuspendVm,
            ActionKind::ResumeVm { .. } => ActionType::ResumeVm,
            ActionKind::KillVm { .. } => ActionType::KillVm,
            ActionKind::ForgeVm { .. } => ActionType::ForgeVm,
            ActionKind::Allocate { .. } => ActionType::Allocate,
            ActionKind::BootNode { .. } => ActionType::BootNode,
            ActionKind::ShutdownNode { .. } => ActionType::ShutdownNode,
        }
    }

    /// The element the action manipulates.
    pub fn element(&self) -> Element {
        match self.kind {
            ActionKind::MigrateVm { vm, .. }
            | ActionKind::BootVm { vm, .. }
            | ActionKind::ShutdownVm { vm, .. }
            | ActionKind::SuspendVm { vm, .. }
            | ActionKind::ResumeVm { vm, .. }
            | ActionKind::KillVm { vm, .. }
            | ActionKind::ForgeVm { vm }
            | ActionKind::Allocate { vm, .. } => Element::Vm(vm),
            ActionKind::BootNode { node } | ActionKind::ShutdownNode { node } => {
                Element::Node(node)
            }
        }
    }

    /// The node the VM leaves, if any.
    pub fn source(&self) -> Option<Node> {
        match self.kind {
            ActionKind::MigrateVm { src, .. }
            | ActionKind::ShutdownVm { src, .. }
            | ActionKind::SuspendVm { src, .. }
            | ActionKind::ResumeVm { src, .. } => Some(src),
            ActionKind::KillVm { host, .. } => host,
            ActionKind::Allocate { host, .. } => Some(host),
            _ => None,
        }
    }

    /// The node the VM ends up on, if any.
    pub fn destination(&self) -> Option<Node> {
        match self.kind {
            ActionKind::MigrateVm { dst, .. }
            | ActionKind::BootVm { dst, .. }
            | ActionKind::SuspendVm { dst, .. }
            | ActionKind::ResumeVm { dst, .. } => Some(dst),
            ActionKind::Allocate { host, .. } => Some(host),
            _ => None,
        }
    }

    pub fn duration(&self) -> i32 {
        self.end - self.start
    }

    /// Apply the action on `model`. Returns `false`, leaving `model` untouched, when the
    /// pre-conditions of the action do not hold.
    pub fn apply(&self, model: &mut Model) -> bool {
        let mapping = model.mapping_mut();
        match &self.kind {
            &ActionKind::MigrateVm { vm, src, dst } => {
                mapping.vm_state(vm) == VmState::Running
                    && mapping.vm_location(vm) == Some(src)
                    && mapping.add_running_vm(vm, dst)
            }
            &ActionKind::BootVm { vm, dst } => {
                mapping.vm_state(vm) == VmState::Ready && mapping.add_running_vm(vm, dst)
            }
            &ActionKind::ShutdownVm { vm, src } => {
                if mapping.vm_state(vm) != VmState::Running || mapping.vm_location(vm) != Some(src)
                {
                    return false;
                }
                mapping.add_ready_vm(vm);
                true
            }
            &ActionKind::SuspendVm { vm, src, dst } => {
                mapping.vm_state(vm) == VmState::Running
                    && mapping.vm_location(vm) == Some(src)
                    && mapping.add_sleeping_vm(vm, dst)
            }
            &ActionKind::ResumeVm { vm, src, dst } => {
                mapping.vm_state(vm) == VmState::Sleeping
                    && mapping.vm_location(vm) == Some(src)
                    && mapping.add_running_vm(vm, dst)
            }
            &ActionKind::KillVm { vm, host } => {
                if mapping.vm_location(vm) != host {
                    return false;
                }
                let _ = mapping.remove_vm(vm);
                true
            }
            &ActionKind::ForgeVm { vm } => {
                if mapping.vm_state(vm) != VmState::Init {
                    return false;
                }
                mapping.add_ready_vm(vm);
                true
            }
            ActionKind::Allocate {
                vm,
                host,
                resource,
                amount,
            } => {
                if !mapping.is_running(*vm) || mapping.vm_location(*vm) != Some(*host) {
                    return false;
                }
                match model.resource_mut(resource) {
                    Some(resource) => {
                        let _ = resource.set_consumption(*vm, *amount);
                        true
                    }
                    None => false,
                }
            }
            &ActionKind::BootNode { node } => {
                if mapping.node_state(node) != Some(NodeState::Offline) {
                    return false;
                }
                mapping.add_online_node(node);
                true
            }
            &ActionKind::ShutdownNode { node } => {
                mapping.node_state(node) == Some(NodeState::Online)
                    && mapping.add_offline_node(node)
            }
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} ", self.start, self.end)?;
        match &self.kind {
            ActionKind::MigrateVm { vm, src, dst } => write!(f, "migrate({vm}, {src}, {dst})"),
            ActionKind::BootVm { vm, dst } => write!(f, "boot({vm}, {dst})"),
            ActionKind::ShutdownVm { vm, src } => write!(f, "shutdown({vm}, {src})"),
            ActionKind::SuspendVm { vm, src, dst } => write!(f, "suspend({vm}, {src}, {dst})"),
            ActionKind::ResumeVm { vm, src, dst } => write!(f, "resume({vm}, {src}, {dst})"),
            ActionKind::KillVm { vm, host: Some(host) } => write!(f, "kill({vm}, {host})"),
            ActionKind::KillVm { vm, host: None } => write!(f, "kill({vm})"),
            ActionKind::ForgeVm { vm } => write!(f, "forge({vm})"),
            ActionKind::Allocate {
                vm,
                host,
                resource,
                amount,
            } => write!(f, "allocate({vm}, {host}, {resource}={amount})"),
            ActionKind::BootNode { node } => write!(f, "boot({node})"),
            ActionKind::ShutdownNode { node } => write!(f, "shutdown({node})"),
        }
    }
}
