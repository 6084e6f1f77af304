use super::NodeTransitionKind;
use super::ReconfigurationProblem;
use super::VmTransitionKind;
use crate::basic_types::Solution;
use crate::plan::Action;
use crate::plan::ActionKind;
use crate::plan::ReconfigurationPlan;

impl ReconfigurationProblem<'_> {
    /// Convert a solution of the problem into the plan it describes.
    pub(crate) fn build_plan(&self, solution: &Solution) -> ReconfigurationPlan {
        let nodes = self.nodes();
        let mut plan = ReconfigurationPlan::new(self.model().clone());

        for transition in self.node_transitions() {
            let online = solution.literal_value(transition.online);
            let kind = match transition.kind {
                NodeTransitionKind::Shutdownable if !online => ActionKind::ShutdownNode {
                    node: transition.node,
                },
                NodeTransitionKind::Bootable if online => ActionKind::BootNode {
                    node: transition.node,
                },
                _ => continue,
            };
            plan.add(Action::new(
                kind,
                solution.value(transition.start),
                solution.value(transition.end),
            ));
        }

        for transition in self.vm_transitions() {
            let vm = transition.vm;
            let source = transition.source.map(|index| nodes[index]);
            let host = transition
                .host
                .map(|host| nodes[solution.value(host) as usize]);

            let kind = match (transition.kind, source, host) {
                (VmTransitionKind::Relocatable, Some(src), Some(dst)) if src != dst => {
                    ActionKind::MigrateVm { vm, src, dst }
                }
                (VmTransitionKind::Boot, _, Some(dst)) => ActionKind::BootVm { vm, dst },
                (VmTransitionKind::Shutdown, Some(src), _) => ActionKind::ShutdownVm { vm, src },
                (VmTransitionKind::Suspend, Some(src), _) => ActionKind::SuspendVm {
                    vm,
                    src,
                    dst: src,
                },
                (VmTransitionKind::Resume, Some(src), Some(dst)) => {
                    ActionKind::ResumeVm { vm, src, dst }
                }
                (VmTransitionKind::Kill, host, _) => ActionKind::KillVm { vm, host },
                (VmTransitionKind::Forge, _, _) => ActionKind::ForgeVm { vm },
                _ => continue,
            };
            plan.add(Action::new(
                kind,
                solution.value(transition.start),
                solution.value(transition.end),
            ));
        }

        for allocation in self.allocations() {
            let transition = &self.vm_transitions()[allocation.vm_transition];
            let Some(host) = transition.host else {
                continue;
            };
            plan.add(Action::new(
                ActionKind::Allocate {
                    vm: transition.vm,
                    host: nodes[solution.value(host) as usize],
                    resource: allocation.resource.clone(),
                    amount: allocation.amount,
                },
                solution.value(allocation.start),
                solution.value(allocation.end),
            ));
        }

        plan
    }

    /// The value of the objective in `solution`: the sum of the ends of the transitions.
    pub(crate) fn cost(&self, solution: &Solution) -> i64 {
        self.transition_ends()
            .into_iter()
            .map(|end| solution.value(end) as i64)
            .sum()
    }
}
