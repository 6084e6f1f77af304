//! The transitions of the elements between their current and their future state.
use crate::engine::variables::DomainId;
use crate::engine::variables::Literal;
use crate::model::Node;
use crate::model::Vm;
use crate::model::VmState;
use crate::plan::ActionType;

/// How a VM goes from its current state to its future state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum VmTransitionKind {
    /// Running before and after; the VM either stays on its host or migrates.
    Relocatable,
    Boot,
    Shutdown,
    Suspend,
    Resume,
    Kill,
    Forge,
    /// Ready or sleeping before and after; nothing happens.
    Stay,
}

impl VmTransitionKind {
    /// The transition between two states, if there is one.
    pub(crate) fn between(current: VmState, future: VmState) -> Option<VmTransitionKind> {
        use VmState::*;
        match (current, future) {
            (Running, Running) => Some(VmTransitionKind::Relocatable),
            (Ready, Running) => Some(VmTransitionKind::Boot),
            (Running, Ready) => Some(VmTransitionKind::Shutdown),
            (Running, Sleeping) => Some(VmTransitionKind::Suspend),
            (Sleeping, Running) => Some(VmTransitionKind::Resume),
            (_, Killed) => Some(VmTransitionKind::Kill),
            (Init, Ready) => Some(VmTransitionKind::Forge),
            (Ready, Ready) | (Sleeping, Sleeping) => Some(VmTransitionKind::Stay),
            _ => None,
        }
    }

    /// The action type the transition is evaluated with, `None` when it never yields an action.
    pub(crate) fn action_type(&self) -> Option<ActionType> {
        match self {
            VmTransitionKind::Relocatable => Some(ActionType::MigrateVm),
            VmTransitionKind::Boot => Some(ActionType::BootVm),
            VmTransitionKind::Shutdown => Some(ActionType::ShutdownVm),
            VmTransitionKind::Suspend => Some(ActionType::SuspendVm),
            VmTransitionKind::Resume => Some(ActionType::ResumeVm),
            VmTransitionKind::Kill => Some(ActionType::KillVm),
            VmTransitionKind::Forge => Some(ActionType::ForgeVm),
            VmTransitionKind::Stay => None,
        }
    }
}

/// The variables of a VM transition.
///
/// `host` is set for transitions ending in the running state and holds the index of the future
/// host. `source` is the index of the current host, for running and sleeping VMs.
#[derive(Clone, Debug)]
pub(crate) struct VmTransition {
    pub(crate) vm: Vm,
    pub(crate) kind: VmTransitionKind,
    pub(crate) current_state: VmState,
    pub(crate) future_state: VmState,
    pub(crate) source: Option<usize>,
    pub(crate) host: Option<DomainId>,
    pub(crate) start: DomainId,
    pub(crate) end: DomainId,
    /// Only for relocatable VMs: true iff the VM does not migrate.
    pub(crate) stay: Option<Literal>,
    pub(crate) managed: bool,
}

impl VmTransition {
    /// Whether the VM leaves its current host during the reconfiguration, when it is known.
    pub(crate) fn leaves_source(&self) -> bool {
        matches!(
            self.kind,
            VmTransitionKind::Shutdown | VmTransitionKind::Suspend | VmTransitionKind::Kill
        ) && self.source.is_some()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NodeTransitionKind {
    /// The node is online and may be shut down.
    Shutdownable,
    /// The node is offline and may be booted.
    Bootable,
}

/// The variables of a node transition.
#[derive(Clone, Debug)]
pub(crate) struct NodeTransition {
    pub(crate) node: Node,
    pub(crate) kind: NodeTransitionKind,
    pub(crate) online: Literal,
    pub(crate) start: DomainId,
    pub(crate) end: DomainId,
}

/// A change of the amount of a resource allocated to a running VM.
#[derive(Clone, Debug)]
pub(crate) struct AllocateTransition {
    /// Index of the VM transition.
    pub(crate) vm_transition: usize,
    pub(crate) resource: String,
    pub(crate) amount: i32,
    pub(crate) start: DomainId,
    pub(crate) end: DomainId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_between_states() {
        use VmState::*;
        assert_eq!(
            Some(VmTransitionKind::Relocatable),
            VmTransitionKind::between(Running, Running)
        );
        assert_eq!(Some(VmTransitionKind::Kill), VmTransitionKind::between(Init, Killed));
        assert_eq!(Some(VmTransitionKind::Forge), VmTransitionKind::between(Init, Ready));
        assert_eq!(Some(VmTransitionKind::Stay), VmTransitionKind::between(Sleeping, Sleeping));
        assert_eq!(None, VmTransitionKind::between(Init, Running));
        assert_eq!(None, VmTransitionKind::between(Ready, Sleeping));
    }
}
