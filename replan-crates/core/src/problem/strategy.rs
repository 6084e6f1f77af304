use super::ReconfigurationProblem;
use super::VmTransitionKind;
use crate::branching::DynamicBrancher;
use crate::branching::FirstFail;
use crate::branching::InDomainMin;
use crate::branching::IndependentVariableValueBrancher;
use crate::branching::InputOrder;
use crate::branching::LeafFirstBrancher;
use crate::branching::Movement;
use crate::branching::PlacementBrancher;
use crate::branching::PlacementItem;
use crate::branching::PreferredValue;
use crate::engine::variables::DomainId;
use crate::problem::NodeTransitionKind;

impl ReconfigurationProblem<'_> {
    /// The branching strategy of the problem: place the VMs, decide the state of the nodes, then
    /// schedule the actions.
    pub(crate) fn search_strategy(&self, random_placement: bool) -> DynamicBrancher {
        let mut brancher = DynamicBrancher::new(Vec::new());
        brancher.add_brancher(Box::new(self.placement_brancher(random_placement)));

        let online = self
            .node_transitions()
            .iter()
            .map(|transition| transition.online.domain_id())
            .collect::<Vec<_>>();
        let current_states = self.node_transitions().iter().map(|transition| {
            let is_online = transition.kind == NodeTransitionKind::Shutdownable;
            (transition.online.domain_id(), i32::from(is_online))
        });
        brancher.add_brancher(Box::new(IndependentVariableValueBrancher::new(
            InputOrder::new(&online),
            PreferredValue::new(current_states),
        )));

        let node_starts = self
            .node_transitions()
            .iter()
            .map(|transition| transition.start)
            .collect::<Vec<_>>();
        brancher.add_brancher(first_fail(&node_starts));

        let movements = self
            .vm_transitions()
            .iter()
            .filter(|transition| transition.kind != VmTransitionKind::Stay)
            .map(|transition| Movement {
                start: transition.start,
                host: transition.host,
                source: transition.source,
                departs: transition.leaves_source(),
            })
            .collect();
        brancher.add_brancher(Box::new(LeafFirstBrancher::new(
            movements,
            self.nodes().len(),
        )));

        let ends = self
            .vm_transitions()
            .iter()
            .map(|transition| transition.end)
            .collect::<Vec<_>>();
        brancher.add_brancher(first_fail(&ends));

        let everything = self.solver.get_domains().collect::<Vec<_>>();
        brancher.add_brancher(first_fail(&everything));
        brancher
    }

    fn placement_brancher(&self, random_placement: bool) -> PlacementBrancher {
        let model = self.model();
        let items = self
            .items()
            .filter_map(|transition| {
                let weight = model
                    .resources()
                    .iter()
                    .map(|resource| i64::from(resource.future_consumption(transition.vm)))
                    .sum();
                Some(PlacementItem {
                    host: transition.host?,
                    source: transition.source.map(|source| source as i32),
                    weight,
                })
            })
            .collect();
        let guide = self
            .resource_dimensions()
            .first()
            .unwrap_or(self.running_vms_dimension());
        PlacementBrancher::new(
            items,
            guide.loads.clone(),
            guide.capacities.clone(),
            random_placement,
        )
    }
}

type FirstFailBrancher = IndependentVariableValueBrancher<FirstFail, InDomainMin>;

fn first_fail(variables: &[DomainId]) -> Box<FirstFailBrancher> {
    Box::new(IndependentVariableValueBrancher::new(
        FirstFail::new(variables),
        InDomainMin,
    ))
}
