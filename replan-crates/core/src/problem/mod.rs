//! The reconfiguration problem: the variables describing the transitions of every element, the
//! propagators tying them together, and the extraction of a plan from a solution.
mod extraction;
mod strategy;
mod transitions;

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use log::debug;
pub(crate) use transitions::*;

use crate::basic_types::ConstraintOperationError;
use crate::constraints::SatConstraint;
use crate::containers::HashMap;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::variables::DomainId;
use crate::engine::variables::Literal;
use crate::engine::ConstraintSolver;
use crate::engine::EmptyDomain;
use crate::model::Model;
use crate::model::Node;
use crate::model::Vm;
use crate::model::VmState;
use crate::plan::ActionType;
use crate::propagators::BinPackingPropagatorArgs;
use crate::propagators::BinaryNotEqualsPropagatorArgs;
use crate::propagators::ConsumingSlice;
use crate::propagators::DemandingSlice;
use crate::propagators::LinearLessOrEqualPropagatorArgs;
use crate::propagators::PrecedencesPropagatorArgs;
use crate::propagators::ReifiedEqualityPropagatorArgs;
use crate::propagators::TaskSchedulerPropagatorArgs;
use crate::scheduler::ModelingError;
use crate::scheduler::Objective;
use crate::scheduler::SchedulerError;
use crate::scheduler::SchedulerParameters;

/// The per-node loads of one dimension of the packing.
#[derive(Clone, Debug)]
pub(crate) struct PackingDimension {
    pub(crate) name: String,
    pub(crate) loads: Vec<DomainId>,
    pub(crate) capacities: Vec<i32>,
}

/// The constraint model of one instance.
///
/// Time is discretised in `[0, horizon]`. VMs arrive on a node once it has booted, and only when
/// its capacity can hold them next to the VMs that have not left yet. Nodes going offline shut
/// down after the departure of their VMs.
#[derive(Debug)]
pub(crate) struct ReconfigurationProblem<'model> {
    model: &'model Model,
    pub(crate) solver: ConstraintSolver,
    horizon: i32,
    nodes: Vec<Node>,
    node_indices: HashMap<Node, usize>,
    node_transitions: Vec<NodeTransition>,
    vm_transitions: Vec<VmTransition>,
    vm_indices: HashMap<Vm, usize>,
    allocations: Vec<AllocateTransition>,
    resources: Vec<PackingDimension>,
    running_vms: PackingDimension,
    /// Indices of the VM transitions ending in the running state; the items of the packing.
    items: Vec<usize>,
    objective: Option<DomainId>,
}

/// Durations of the actions, evaluated before any variable is created.
struct Durations {
    vms: Vec<i32>,
    nodes: Vec<i32>,
    allocations: Vec<(usize, String, i32, i32)>,
}

impl<'model> ReconfigurationProblem<'model> {
    /// Create the variables and propagators of the instance `(model, constraints)`.
    pub(crate) fn build(
        model: &'model Model,
        constraints: &[SatConstraint],
        objective: Objective,
        parameters: &SchedulerParameters,
    ) -> Result<ReconfigurationProblem<'model>, SchedulerError> {
        let future_states = future_vm_states(model, constraints)?;
        let managed = managed_vms(model, constraints, &future_states, parameters.repair);

        let mut vm_kinds = Vec::with_capacity(future_states.len());
        for (&vm, &future_state) in future_states.iter() {
            let current_state = model.mapping().vm_state(vm);
            let Some(kind) = VmTransitionKind::between(current_state, future_state) else {
                return Err(ModelingError::new(
                    model,
                    format!("{vm} can not go from {current_state:?} to {future_state:?}"),
                )
                .into());
            };
            vm_kinds.push((vm, kind, current_state, future_state));
        }

        let nodes = model.mapping().all_nodes().collect::<Vec<_>>();
        let durations = evaluate_durations(model, parameters, &nodes, &vm_kinds, &managed)?;
        let horizon = durations
            .vms
            .iter()
            .chain(durations.nodes.iter())
            .chain(durations.allocations.iter().map(|(_, _, _, duration)| duration))
            .map(|&duration| duration as i64)
            .sum::<i64>()
            .min(parameters.max_end as i64)
            .max(0) as i32;

        let mut problem = ReconfigurationProblem {
            model,
            solver: ConstraintSolver::default(),
            horizon,
            node_indices: nodes
                .iter()
                .enumerate()
                .map(|(index, &node)| (node, index))
                .collect(),
            nodes,
            node_transitions: Vec::new(),
            vm_transitions: Vec::new(),
            vm_indices: HashMap::default(),
            allocations: Vec::new(),
            resources: Vec::new(),
            running_vms: PackingDimension {
                name: "running".to_owned(),
                loads: Vec::new(),
                capacities: Vec::new(),
            },
            items: Vec::new(),
            objective: None,
        };

        problem.make_node_transitions(&durations.nodes)?;
        for (index, &(vm, kind, current_state, future_state)) in vm_kinds.iter().enumerate() {
            let is_managed = managed.contains(&vm);
            problem.make_vm_transition(
                vm,
                kind,
                (current_state, future_state),
                durations.vms[index],
                is_managed,
            )?;
        }
        for (vm_transition, resource, amount, duration) in durations.allocations {
            problem.make_allocation(vm_transition, resource, amount, duration)?;
        }
        problem.make_packing()?;
        problem.make_schedulers()?;
        match objective {
            Objective::MinMttr => problem.make_objective()?,
        }

        for constraint in constraints {
            constraint.post(&mut problem)?;
        }

        debug!(
            "built a problem with {} nodes, {} VMs, {} variables and {} propagators (horizon {})",
            problem.nodes.len(),
            problem.vm_transitions.len(),
            problem.solver.num_domains(),
            problem.solver.num_propagators(),
            problem.horizon,
        );
        Ok(problem)
    }

    fn make_node_transitions(&mut self, durations: &[i32]) -> Result<(), SchedulerError> {
        for (index, &node) in self.nodes.clone().iter().enumerate() {
            let duration = durations[index];
            let online = self.solver.new_literal();
            let action_duration = self.new_duration(duration);
            let start = self.new_time();
            let end = self.new_time();
            self.post_interval(start, action_duration, end)?;

            let kind = if self.model.mapping().is_online(node) {
                // Staying online takes no time.
                self.post(ReifiedEqualityPropagatorArgs {
                    literal: online,
                    var: action_duration,
                    value: 0,
                })?;
                NodeTransitionKind::Shutdownable
            } else {
                // Booting takes the whole duration, staying offline none.
                self.post_linear_less_or_equal(
                    vec![(1, action_duration), (-duration, online.domain_id())],
                    0,
                )?;
                self.post_linear_less_or_equal(
                    vec![(-1, action_duration), (duration, online.domain_id())],
                    0,
                )?;
                NodeTransitionKind::Bootable
            };

            self.node_transitions.push(NodeTransition {
                node,
                kind,
                online,
                start,
                end,
            });
        }
        Ok(())
    }

    fn make_vm_transition(
        &mut self,
        vm: Vm,
        kind: VmTransitionKind,
        (current_state, future_state): (VmState, VmState),
        duration: i32,
        managed: bool,
    ) -> Result<(), SchedulerError> {
        let source = self
            .model
            .mapping()
            .vm_location(vm)
            .and_then(|node| self.node_index(node));

        let mut host = None;
        let mut stay = None;
        let (start, end) = match kind {
            VmTransitionKind::Stay => (self.solver.new_constant(0), self.solver.new_constant(0)),
            VmTransitionKind::Relocatable => {
                let source = source.ok_or_else(|| self.unplaced(vm))?;
                let host_var = self.new_host()?;
                if !managed {
                    self.restrict(|context| context.instantiate(host_var, source as i32))?;
                }
                let stay_literal = self.solver.new_literal();
                let migration = self.new_duration(duration);
                let start = self.new_time();
                let end = self.new_time();

                self.post(ReifiedEqualityPropagatorArgs {
                    literal: stay_literal,
                    var: host_var,
                    value: source as i32,
                })?;
                self.post(ReifiedEqualityPropagatorArgs {
                    literal: stay_literal,
                    var: migration,
                    value: 0,
                })?;
                self.post_interval(start, migration, end)?;
                self.post_departure(end, source)?;
                self.post_arrival(host_var, start, Some(source))?;

                host = Some(host_var);
                stay = Some(stay_literal);
                (start, end)
            }
            VmTransitionKind::Boot | VmTransitionKind::Resume => {
                let host_var = self.new_host()?;
                let (start, end) = self.new_fixed_interval(duration)?;
                self.post_arrival(host_var, start, None)?;
                host = Some(host_var);
                (start, end)
            }
            VmTransitionKind::Shutdown | VmTransitionKind::Suspend | VmTransitionKind::Kill => {
                let (start, end) = self.new_fixed_interval(duration)?;
                if let Some(source) = source {
                    self.post_departure(end, source)?;
                }
                (start, end)
            }
            VmTransitionKind::Forge => self.new_fixed_interval(duration)?,
        };

        // Sleeping VMs keep their host online.
        if future_state == VmState::Sleeping {
            if let Some(source) = source {
                let online = self.node_transitions[source].online;
                self.restrict(|context| context.set_literal(online, true))?;
            }
        }

        let index = self.vm_transitions.len();
        if host.is_some() {
            self.items.push(index);
        }
        let _ = self.vm_indices.insert(vm, index);
        self.vm_transitions.push(VmTransition {
            vm,
            kind,
            current_state,
            future_state,
            source,
            host,
            start,
            end,
            stay,
            managed,
        });
        Ok(())
    }

    fn make_allocation(
        &mut self,
        vm_transition: usize,
        resource: String,
        amount: i32,
        duration: i32,
    ) -> Result<(), SchedulerError> {
        let transition = &self.vm_transitions[vm_transition];
        let (vm_end, stay) = (transition.end, transition.stay);
        let (start, end) = self.new_fixed_interval(duration)?;

        // The allocation happens once the VM is on its final host. A VM staying on its host
        // changes its consumption at the end of its transition.
        self.post_linear_less_or_equal(vec![(1, vm_end), (-1, start)], 0)?;
        if let Some(stay) = stay {
            self.post_linear_less_or_equal(
                vec![(1, start), (-1, vm_end), (self.horizon, stay.domain_id())],
                self.horizon,
            )?;
        }

        self.allocations.push(AllocateTransition {
            vm_transition,
            resource,
            amount,
            start,
            end,
        });
        Ok(())
    }

    fn make_packing(&mut self) -> Result<(), SchedulerError> {
        let model = self.model;
        let num_items = self.items.len() as i32;
        self.running_vms.capacities = vec![num_items; self.nodes.len()];
        self.running_vms.loads = (0..self.nodes.len())
            .map(|_| self.solver.new_bounded_integer(0, num_items))
            .collect();

        for resource in model.resources() {
            let capacities = self
                .nodes
                .iter()
                .map(|&node| resource.capacity(node).max(0))
                .collect::<Vec<_>>();
            let loads = capacities
                .iter()
                .map(|&capacity| self.solver.new_bounded_integer(0, capacity))
                .collect();
            self.resources.push(PackingDimension {
                name: resource.name().to_owned(),
                loads,
                capacities,
            });
        }

        // Offline nodes host no running VM.
        for index in 0..self.nodes.len() {
            let online = self.node_transitions[index].online;
            let load = self.running_vms.loads[index];
            self.post_linear_less_or_equal(
                vec![(1, load), (-num_items, online.domain_id())],
                0,
            )?;
        }

        if self.items.is_empty() {
            return Ok(());
        }

        let bins = self
            .items
            .iter()
            .filter_map(|&item| self.vm_transitions[item].host)
            .collect::<Box<[_]>>();
        let mut loads = vec![self.running_vms.loads.clone().into_boxed_slice()];
        let mut sizes = vec![vec![1; self.items.len()].into_boxed_slice()];
        for (dimension, resource) in self.resources.iter().zip(model.resources()) {
            loads.push(dimension.loads.clone().into_boxed_slice());
            sizes.push(
                self.items
                    .iter()
                    .map(|&item| resource.future_consumption(self.vm_transitions[item].vm))
                    .collect(),
            );
        }

        self.post(BinPackingPropagatorArgs {
            loads: loads.into_boxed_slice(),
            sizes: sizes.into_boxed_slice(),
            bins,
        })
    }

    /// One task scheduler per node, over every resource of the model.
    fn make_schedulers(&mut self) -> Result<(), SchedulerError> {
        let model = self.model;
        if model.resources().is_empty() {
            return Ok(());
        }

        for node in 0..self.nodes.len() {
            let mut consuming = Vec::new();
            let mut resident: HashMap<_, _> = HashMap::default();
            for (index, transition) in self.vm_transitions.iter().enumerate() {
                if transition.source != Some(node) || transition.current_state != VmState::Running
                {
                    continue;
                }
                let _ = resident.insert(index, consuming.len());
                consuming.push(ConsumingSlice {
                    end: transition.end,
                    usages: model
                        .resources()
                        .iter()
                        .map(|resource| resource.consumption(transition.vm))
                        .collect(),
                });
            }

            let demanding = self
                .items
                .iter()
                .filter_map(|&index| {
                    let transition = &self.vm_transitions[index];
                    Some(DemandingSlice {
                        host: transition.host?,
                        start: transition.start,
                        usages: model
                            .resources()
                            .iter()
                            .map(|resource| resource.future_consumption(transition.vm))
                            .collect(),
                        resident: resident.get(&index).copied(),
                    })
                })
                .collect::<Box<[_]>>();
            if demanding.is_empty() {
                continue;
            }

            let capacities = model
                .resources()
                .iter()
                .map(|resource| resource.capacity(self.nodes[node]).max(0))
                .collect();
            self.post(TaskSchedulerPropagatorArgs {
                node: node as i32,
                capacities,
                consuming: consuming.into_boxed_slice(),
                demanding,
            })?;
        }
        Ok(())
    }

    /// The mean time to repair: the sum of the ends of all the transitions.
    fn make_objective(&mut self) -> Result<(), SchedulerError> {
        let ends = self.transition_ends();
        let upper_bound = (self.horizon as i64 * ends.len() as i64).min(i32::MAX as i64) as i32;
        let cost = self.solver.new_bounded_integer(0, upper_bound);

        let mut terms = ends.iter().map(|&end| (1, end)).collect::<Vec<_>>();
        terms.push((-1, cost));
        self.post_linear_less_or_equal(terms.clone(), 0)?;
        self.post_linear_less_or_equal(
            terms.into_iter().map(|(weight, var)| (-weight, var)).collect(),
            0,
        )?;

        self.objective = Some(cost);
        Ok(())
    }

    /// A variable holding the index of a node.
    fn new_host(&mut self) -> Result<DomainId, SchedulerError> {
        if self.nodes.is_empty() {
            debug!("a VM must run but there is no node");
            return Err(SchedulerError::Infeasible);
        }
        let nodes = (0..self.nodes.len() as i32).collect::<Vec<_>>();
        Ok(self.solver.new_enumerated_integer(&nodes))
    }

    /// The duration of an action that may not happen: either `0` or `duration`.
    fn new_duration(&mut self, duration: i32) -> DomainId {
        self.solver.new_enumerated_integer(&[0, duration])
    }

    fn new_time(&mut self) -> DomainId {
        self.solver.new_bounded_integer(0, self.horizon)
    }

    /// A `[start, end]` interval of the given constant duration.
    fn new_fixed_interval(
        &mut self,
        duration: i32,
    ) -> Result<(DomainId, DomainId), SchedulerError> {
        let start = self.new_time();
        let end = self.new_time();
        self.post_linear_less_or_equal(vec![(1, start), (-1, end)], -duration)?;
        self.post_linear_less_or_equal(vec![(-1, start), (1, end)], duration)?;
        Ok((start, end))
    }

    /// `end = start + duration`.
    fn post_interval(
        &mut self,
        start: DomainId,
        duration: DomainId,
        end: DomainId,
    ) -> Result<(), SchedulerError> {
        self.post_linear_less_or_equal(vec![(1, start), (1, duration), (-1, end)], 0)?;
        self.post_linear_less_or_equal(vec![(-1, start), (-1, duration), (1, end)], 0)
    }

    /// A VM leaving the node `source` is gone before the node shuts down.
    fn post_departure(&mut self, end: DomainId, source: usize) -> Result<(), SchedulerError> {
        let transition = &self.node_transitions[source];
        if transition.kind != NodeTransitionKind::Shutdownable {
            return Ok(());
        }
        let (start, online) = (transition.start, transition.online);
        self.post_linear_less_or_equal(
            vec![(1, end), (-1, start), (-self.horizon, online.domain_id())],
            0,
        )
    }

    /// A VM arriving on a node other than `source` starts once the node has booted.
    fn post_arrival(
        &mut self,
        host: DomainId,
        start: DomainId,
        source: Option<usize>,
    ) -> Result<(), SchedulerError> {
        let others = self
            .node_transitions
            .iter()
            .enumerate()
            .filter(|&(index, transition)| {
                Some(index) != source && transition.kind == NodeTransitionKind::Bootable
            })
            .map(|(index, transition)| (index as i32, transition.end))
            .collect::<Box<[_]>>();
        if others.is_empty() {
            return Ok(());
        }
        self.post(PrecedencesPropagatorArgs {
            host,
            start,
            others,
        })
    }

    fn unplaced(&self, vm: Vm) -> SchedulerError {
        ModelingError::new(self.model, format!("{vm} is running but has no host")).into()
    }

    pub(crate) fn post<Constructor: PropagatorConstructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<(), SchedulerError> {
        self.solver
            .add_propagator(constructor)
            .map(|_| ())
            .map_err(operation_failed)
    }

    pub(crate) fn post_linear_less_or_equal(
        &mut self,
        terms: Vec<(i32, DomainId)>,
        c: i32,
    ) -> Result<(), SchedulerError> {
        self.post(LinearLessOrEqualPropagatorArgs {
            terms: terms.into_boxed_slice(),
            c,
        })
    }

    pub(crate) fn post_equal(&mut self, a: DomainId, b: DomainId) -> Result<(), SchedulerError> {
        self.post_linear_less_or_equal(vec![(1, a), (-1, b)], 0)?;
        self.post_linear_less_or_equal(vec![(-1, a), (1, b)], 0)
    }

    pub(crate) fn post_not_equal(
        &mut self,
        a: DomainId,
        b: DomainId,
    ) -> Result<(), SchedulerError> {
        self.post(BinaryNotEqualsPropagatorArgs { a, b })
    }

    /// Narrow domains at the root, before the search starts.
    pub(crate) fn restrict(
        &mut self,
        narrowing: impl FnOnce(&mut PropagationContextMut<'_>) -> Result<bool, EmptyDomain>,
    ) -> Result<(), SchedulerError> {
        self.solver.restrict(narrowing).map_err(operation_failed)
    }

    pub(crate) fn model(&self) -> &'model Model {
        self.model
    }

    pub(crate) fn horizon(&self) -> i32 {
        self.horizon
    }

    pub(crate) fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn node_index(&self, node: Node) -> Option<usize> {
        self.node_indices.get(&node).copied()
    }

    pub(crate) fn node_transitions(&self) -> &[NodeTransition] {
        &self.node_transitions
    }

    pub(crate) fn node_transition(&self, node: Node) -> Option<&NodeTransition> {
        self.node_index(node)
            .map(|index| &self.node_transitions[index])
    }

    pub(crate) fn node_online(&self, node: Node) -> Option<Literal> {
        self.node_transition(node).map(|transition| transition.online)
    }

    pub(crate) fn vm_transitions(&self) -> &[VmTransition] {
        &self.vm_transitions
    }

    pub(crate) fn vm_transition(&self, vm: Vm) -> Option<&VmTransition> {
        self.vm_indices
            .get(&vm)
            .map(|&index| &self.vm_transitions[index])
    }

    /// The variable holding the future host of `vm`, if it ends running.
    pub(crate) fn vm_host(&self, vm: Vm) -> Option<DomainId> {
        self.vm_transition(vm).and_then(|transition| transition.host)
    }

    pub(crate) fn allocations(&self) -> &[AllocateTransition] {
        &self.allocations
    }

    pub(crate) fn items(&self) -> impl Iterator<Item = &VmTransition> + '_ {
        self.items.iter().map(|&item| &self.vm_transitions[item])
    }

    pub(crate) fn resource_dimension(&self, name: &str) -> Option<&PackingDimension> {
        self.resources
            .iter()
            .find(|dimension| dimension.name == name)
    }

    pub(crate) fn resource_dimensions(&self) -> &[PackingDimension] {
        &self.resources
    }

    pub(crate) fn running_vms_dimension(&self) -> &PackingDimension {
        &self.running_vms
    }

    pub(crate) fn objective(&self) -> Option<DomainId> {
        self.objective
    }

    /// The end variables of every transition which may yield an action.
    pub(crate) fn transition_ends(&self) -> Vec<DomainId> {
        self.vm_transitions
            .iter()
            .filter(|transition| transition.kind != VmTransitionKind::Stay)
            .map(|transition| transition.end)
            .chain(self.node_transitions.iter().map(|transition| transition.end))
            .chain(self.allocations.iter().map(|allocation| allocation.end))
            .collect()
    }
}

fn operation_failed(error: ConstraintOperationError) -> SchedulerError {
    debug!("the problem is infeasible at the root: {error}");
    SchedulerError::Infeasible
}

/// The state every VM of the instance must reach: the one required by the constraints, otherwise
/// its current one.
pub(crate) fn future_vm_states(
    model: &Model,
    constraints: &[SatConstraint],
) -> Result<BTreeMap<Vm, VmState>, SchedulerError> {
    let mut desired: BTreeMap<Vm, VmState> = BTreeMap::new();
    for (vm, state) in constraints
        .iter()
        .flat_map(|constraint| constraint.desired_vm_states())
    {
        match desired.insert(vm, state) {
            Some(other) if other != state => {
                return Err(ModelingError::new(
                    model,
                    format!("{vm} is required to be both {other:?} and {state:?}"),
                )
                .into());
            }
            _ => {}
        }
    }

    let mut states = model
        .mapping()
        .all_vms()
        .map(|vm| (vm, model.mapping().vm_state(vm)))
        .collect::<BTreeMap<_, _>>();
    states.extend(desired);
    Ok(states)
}

/// The VMs whose placement may change. In repair mode these are the VMs the constraints consider
/// misplaced and the VMs changing state; otherwise every VM.
pub(crate) fn managed_vms(
    model: &Model,
    constraints: &[SatConstraint],
    future_states: &BTreeMap<Vm, VmState>,
    repair: bool,
) -> BTreeSet<Vm> {
    if !repair {
        return future_states.keys().copied().collect();
    }

    let mut managed = constraints
        .iter()
        .flat_map(|constraint| constraint.misplaced_vms(model))
        .collect::<BTreeSet<_>>();
    managed.extend(
        future_states
            .iter()
            .filter(|&(&vm, &state)| model.mapping().vm_state(vm) != state)
            .map(|(&vm, _)| vm),
    );
    debug!("repair mode: managing {} of {} VMs", managed.len(), future_states.len());
    managed
}

fn evaluate_durations(
    model: &Model,
    parameters: &SchedulerParameters,
    nodes: &[Node],
    vm_kinds: &[(Vm, VmTransitionKind, VmState, VmState)],
    managed: &BTreeSet<Vm>,
) -> Result<Durations, SchedulerError> {
    let evaluators = &parameters.durations;

    let mut vms = Vec::with_capacity(vm_kinds.len());
    let mut allocations = Vec::new();
    for (index, &(vm, kind, _, _)) in vm_kinds.iter().enumerate() {
        let duration = match kind.action_type() {
            Some(ActionType::MigrateVm) if !managed.contains(&vm) => 0,
            Some(action_type) => evaluators.evaluate(model, action_type, vm)?,
            None => 0,
        };
        vms.push(duration);

        if kind == VmTransitionKind::Relocatable {
            for resource in model.resources() {
                let amount = resource.future_consumption(vm);
                if amount != resource.consumption(vm) {
                    let duration = evaluators.evaluate(model, ActionType::Allocate, vm)?;
                    allocations.push((index, resource.name().to_owned(), amount, duration));
                }
            }
        }
    }

    let nodes = nodes
        .iter()
        .map(|&node| {
            let action_type = if model.mapping().is_online(node) {
                ActionType::ShutdownNode
            } else {
                ActionType::BootNode
            };
            evaluators.evaluate(model, action_type, node)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Durations {
        vms,
        nodes,
        allocations,
    })
}
