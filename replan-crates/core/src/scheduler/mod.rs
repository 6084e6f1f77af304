//! The entry point of the crate: turn an [`Instance`] into a [`ReconfigurationPlan`].
//!
//! The [`DefaultScheduler`] builds a reconfiguration problem from the model and the constraints,
//! searches it depth first, and extracts the plan of the best solution found. Large instances can
//! be split into independent partitions solved in parallel with
//! [`DefaultScheduler::solve_partitioned`].
mod duration;
mod error;
mod parameters;
mod statistics;

pub use duration::*;
pub use error::*;
use log::debug;
use log::info;
use log::warn;
pub use parameters::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
pub use statistics::*;

use crate::basic_types::time::Instant;
use crate::constraints::SatConstraint;
use crate::model::Model;
use crate::partitioning::solve_partitions;
use crate::partitioning::PartitioningStrategy;
use crate::plan::ReconfigurationPlan;
use crate::problem::ReconfigurationProblem;
use crate::replan_assert_simple;
use crate::search::DepthFirstSearch;
use crate::search::SearchOutcome;
use crate::statistics::log_statistic_postfix;
use crate::statistics::should_log_statistics;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::termination::Combinator;
use crate::termination::StopFlag;
use crate::termination::TerminationCondition;
use crate::termination::TimeBudget;

/// What the scheduler minimises.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Objective {
    /// The sum of the end times of every action: the mean time to repair.
    #[default]
    MinMttr,
}

/// A model and the constraints its reconfiguration must satisfy.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub model: Model,
    pub constraints: Vec<SatConstraint>,
    pub objective: Objective,
}

impl Instance {
    pub fn new(model: Model, constraints: impl IntoIterator<Item = SatConstraint>) -> Instance {
        Instance {
            model,
            constraints: constraints.into_iter().collect(),
            objective: Objective::default(),
        }
    }
}

/// A plan and how it was found.
#[derive(Clone, Debug)]
pub struct SolvingResult {
    pub plan: ReconfigurationPlan,
    pub statistics: SolvingStatistics,
}

/// Computes reconfiguration plans.
#[derive(Clone, Debug, Default)]
pub struct DefaultScheduler {
    parameters: SchedulerParameters,
}

impl DefaultScheduler {
    pub fn new(parameters: SchedulerParameters) -> DefaultScheduler {
        DefaultScheduler { parameters }
    }

    pub fn parameters(&self) -> &SchedulerParameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut SchedulerParameters {
        &mut self.parameters
    }

    /// Compute a plan leading `instance.model` to a model satisfying every constraint.
    ///
    /// The objective of the instance is always evaluated. When optimising, the plan minimises it
    /// unless the time limit expired first; otherwise the first plan found is returned. The
    /// status in the statistics tells which.
    pub fn solve(&self, instance: &Instance) -> Result<SolvingResult, SchedulerError> {
        let mut termination = Combinator::new(self.time_budget(), StopFlag::new());
        let result = solve_instance(
            &instance.model,
            &instance.constraints,
            instance.objective,
            &self.parameters,
            &mut termination,
        );
        log_outcome(&result);
        result
    }

    /// Like [`DefaultScheduler::solve`], but the instance is first split by `strategy` into
    /// partitions solved concurrently by [`SchedulerParameters::workers`] threads.
    pub fn solve_partitioned(
        &self,
        instance: &Instance,
        strategy: &impl PartitioningStrategy,
    ) -> Result<SolvingResult, SchedulerError> {
        let result = solve_partitions(instance, strategy, &self.parameters, self.time_budget());
        log_outcome(&result);
        result
    }

    fn time_budget(&self) -> Option<TimeBudget> {
        self.parameters.time_limit.map(TimeBudget::starting_now)
    }
}

/// Build and search the problem of `(model, constraints)` until `termination` stops it.
pub(crate) fn solve_instance(
    model: &Model,
    constraints: &[SatConstraint],
    objective: Objective,
    parameters: &SchedulerParameters,
    termination: &mut impl TerminationCondition,
) -> Result<SolvingResult, SchedulerError> {
    let started_at = Instant::now();
    let mut problem = ReconfigurationProblem::build(model, constraints, objective, parameters)?;
    debug!(
        "problem built with {} variables and {} propagators in {:?}",
        problem.solver.num_domains(),
        problem.solver.num_propagators(),
        started_at.elapsed()
    );

    let mut search = DepthFirstSearch::new(problem.search_strategy(parameters.random_placement));
    let mut random = SmallRng::seed_from_u64(parameters.random_seed);
    let cost = problem.objective();
    let bounded = cost.filter(|_| parameters.optimise);
    let mut objective_trace = Vec::new();
    let outcome = search.solve(
        &mut problem.solver,
        bounded,
        termination,
        &mut random,
        |solution, _| {
            if let Some(cost) = cost {
                objective_trace.push((started_at.elapsed(), i64::from(solution.value(cost))));
            }
        },
    );

    let search_statistics = search.statistics();
    let mut statistics = SolvingStatistics {
        num_nodes: model.mapping().num_nodes(),
        num_vms: model.mapping().num_vms(),
        num_partitions: 1,
        num_decisions: search_statistics.num_decisions,
        num_backtracks: search_statistics.num_backtracks,
        num_solutions: search_statistics.num_solutions,
        peak_depth: search_statistics.peak_depth,
        solving_time: started_at.elapsed(),
        objective_trace,
        status: SolvingStatus::Optimal,
    };

    let solution = match outcome {
        SearchOutcome::Optimal(solution) if parameters.optimise => solution,
        SearchOutcome::Optimal(solution) | SearchOutcome::Satisfiable(solution) => {
            statistics.status = SolvingStatus::Satisfiable;
            solution
        }
        SearchOutcome::Infeasible => return Err(SchedulerError::Infeasible),
        SearchOutcome::Unknown => {
            let seconds = parameters.time_limit.map_or(0, |limit| limit.as_secs());
            return Err(SchedulerError::Unstatable(seconds));
        }
    };

    replan_assert_simple!(
        statistics.objective() == cost.map(|_| problem.cost(&solution)),
        "the recorded objective differs from the cost of the solution"
    );
    let plan = problem.build_plan(&solution);
    check_plan(&plan, constraints);
    Ok(SolvingResult { plan, statistics })
}

fn check_plan(plan: &ReconfigurationPlan, constraints: &[SatConstraint]) {
    let Some(result) = plan.result() else {
        warn!("the computed plan can not be applied on its origin model");
        return;
    };
    for constraint in constraints {
        if !constraint.is_satisfied(&result) {
            warn!("the computed plan does not satisfy {constraint:?}");
        }
    }
}

fn log_outcome(result: &Result<SolvingResult, SchedulerError>) {
    match result {
        Ok(SolvingResult { plan, statistics }) => {
            info!(
                "{} plan with {} actions ending at {} found in {:?}",
                statistics.status,
                plan.len(),
                plan.duration(),
                statistics.solving_time
            );
            if should_log_statistics() {
                statistics.log(StatisticLogger::default());
                log_statistic_postfix();
            }
        }
        Err(error) => info!("no plan: {error}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Offline;
    use crate::constraints::Running;
    use crate::model::Node;
    use crate::model::ShareableResource;
    use crate::model::Vm;
    use crate::plan::ActionType;

    fn two_nodes_one_vm() -> (Model, Node, Node, Vm) {
        let mut model = Model::default();
        let n0 = model.new_node();
        let n1 = model.new_node();
        let vm = model.new_vm();
        model.mapping_mut().add_online_node(n0);
        model.mapping_mut().add_online_node(n1);
        assert!(model.mapping_mut().add_running_vm(vm, n0));
        model.add_resource(ShareableResource::new("cpu", 4, 2));
        (model, n0, n1, vm)
    }

    #[test]
    fn a_satisfied_instance_needs_no_action() {
        let (model, _, _, vm) = two_nodes_one_vm();
        let instance = Instance::new(model, [Running::new([vm]).into()]);

        let result = DefaultScheduler::default()
            .solve(&instance)
            .expect("the instance is satisfiable");
        assert!(result.plan.is_empty());
    }

    #[test]
    fn shutting_down_a_node_migrates_its_vms() {
        let (model, n0, n1, vm) = two_nodes_one_vm();
        let instance = Instance::new(model, [Offline::new([n0]).into()]);
        let parameters = SchedulerParameters::default().with_optimisation(true);

        let result = DefaultScheduler::new(parameters)
            .solve(&instance)
            .expect("the instance is satisfiable");
        let types = result
            .plan
            .actions()
            .iter()
            .map(|action| action.action_type())
            .collect::<Vec<_>>();
        assert_eq!(vec![ActionType::MigrateVm, ActionType::ShutdownNode], types);
        let migration = &result.plan.actions()[0];
        assert_eq!(Some(n1), migration.destination());
        assert_eq!(SolvingStatus::Optimal, result.statistics.status);
        assert_eq!(Some(3), result.statistics.objective());
    }

    #[test]
    fn the_first_plan_reports_its_objective_without_optimising() {
        let (model, n0, _, _) = two_nodes_one_vm();
        let instance = Instance::new(model, [Offline::new([n0]).into()]);

        let result = DefaultScheduler::default()
            .solve(&instance)
            .expect("the instance is satisfiable");
        assert_eq!(1, result.statistics.num_solutions);
        assert_eq!(SolvingStatus::Satisfiable, result.statistics.status);
        assert!(result.statistics.objective().is_some_and(|value| value >= 3));
    }

    #[test]
    fn an_unknown_node_is_a_modeling_error() {
        let (model, _, _, _) = two_nodes_one_vm();
        let ghost = Node::new(42);
        let instance = Instance::new(model, [Offline::new([ghost]).into()]);

        let error = DefaultScheduler::default()
            .solve(&instance)
            .expect_err("the node does not exist");
        assert!(matches!(error, SchedulerError::Modeling(_)));
    }
}
