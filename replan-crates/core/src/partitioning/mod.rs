//! Splitting an instance into independent partitions solved in parallel.
//!
//! A [`PartitioningStrategy`] gives the initial node sets. Every VM follows its host, and a VM
//! which may be placed anew merges the partitions of all the nodes it may end up on. Constraints
//! which keep their meaning when restricted to a partition are split; the others merge the
//! partitions they touch. The partitions are then solved on a thread pool sharing the time budget,
//! and their plans are merged.
//!
//! A partition proven infeasible stops the others, since the whole instance is then infeasible.
mod splitter;
mod strategies;
mod union_find;

use std::fmt::Debug;

use log::debug;
use log::info;
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
pub(crate) use splitter::*;
pub use strategies::*;
pub(crate) use union_find::UnionFind;

use crate::basic_types::time::Duration;
use crate::basic_types::time::Instant;
use crate::model::Model;
use crate::model::Node;
use crate::plan::ReconfigurationPlan;
use crate::scheduler::solve_instance;
use crate::scheduler::Instance;
use crate::scheduler::ModelingError;
use crate::scheduler::SchedulerError;
use crate::scheduler::SchedulerParameters;
use crate::scheduler::SolvingResult;
use crate::scheduler::SolvingStatistics;
use crate::termination::Combinator;
use crate::termination::StopFlag;
use crate::termination::TimeBudget;

/// Decides the initial partitions of an instance.
pub trait PartitioningStrategy: Debug {
    /// Disjoint node sets covering every node of `model`.
    fn node_sets(&self, model: &Model) -> Result<Vec<Vec<Node>>, ModelingError>;
}

/// Solve the partitions of `instance` concurrently and merge their plans.
pub(crate) fn solve_partitions(
    instance: &Instance,
    strategy: &impl PartitioningStrategy,
    parameters: &SchedulerParameters,
    time_budget: Option<TimeBudget>,
) -> Result<SolvingResult, SchedulerError> {
    let started_at = Instant::now();
    let partitions = split(instance, strategy, parameters.repair)?;
    info!(
        "solving {} partitions with {} workers",
        partitions.len(),
        parameters.workers
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(parameters.workers)
        .build()
        .map_err(|error| {
            ModelingError::with_source(&instance.model, "unable to start the workers", error)
        })?;
    let stop = StopFlag::new();
    let results = pool.install(|| {
        partitions
            .par_iter()
            .enumerate()
            .map(|(index, partition)| {
                let model = instance.model.restrict_to(&partition.nodes, &partition.vms);
                let mut termination = Combinator::new(time_budget, stop.clone());
                let result = solve_instance(
                    &model,
                    &partition.constraints,
                    instance.objective,
                    parameters,
                    &mut termination,
                );
                match &result {
                    Ok(_) => debug!("partition {index} solved"),
                    Err(SchedulerError::Unstatable(_)) => debug!("partition {index} stopped"),
                    Err(error) => {
                        debug!("partition {index} failed: {error}");
                        stop.raise();
                    }
                }
                result
            })
            .collect::<Vec<_>>()
    });

    let mut result = aggregate(&instance.model, results)?;
    result.statistics.solving_time = started_at.elapsed();
    Ok(result)
}

/// Merge the results of the partitions. A modeling error wins over infeasibility, which wins over
/// a timeout.
fn aggregate(
    model: &Model,
    results: Vec<Result<SolvingResult, SchedulerError>>,
) -> Result<SolvingResult, SchedulerError> {
    let mut plan = ReconfigurationPlan::new(model.clone());
    let mut statistics = SolvingStatistics::default();
    let mut traces = Vec::with_capacity(results.len());
    let mut modeling_error = None;
    let mut is_infeasible = false;
    let mut timeout = None;

    for result in results {
        match result {
            Ok(partial) => {
                plan.merge(partial.plan);
                statistics.merge_counters(&partial.statistics);
                traces.push(partial.statistics.objective_trace);
            }
            Err(SchedulerError::Modeling(error)) => {
                let _ = modeling_error.get_or_insert(error);
            }
            Err(SchedulerError::Infeasible) => is_infeasible = true,
            Err(SchedulerError::Unstatable(seconds)) => timeout = Some(seconds),
        }
    }

    if let Some(error) = modeling_error {
        return Err(error.into());
    }
    if is_infeasible {
        return Err(SchedulerError::Infeasible);
    }
    if let Some(seconds) = timeout {
        return Err(SchedulerError::Unstatable(seconds));
    }
    statistics.objective_trace = combine_traces(&traces);
    Ok(SolvingResult { plan, statistics })
}

/// The objective of the whole instance over time: the sum of the latest value of every partition,
/// once each has one.
fn combine_traces(traces: &[Vec<(Duration, i64)>]) -> Vec<(Duration, i64)> {
    let mut events = traces
        .iter()
        .enumerate()
        .flat_map(|(partition, trace)| {
            trace
                .iter()
                .map(move |&(elapsed, value)| (elapsed, partition, value))
        })
        .collect::<Vec<_>>();
    events.sort_by_key(|&(elapsed, partition, _)| (elapsed, partition));

    // Partitions which never report a value contribute nothing.
    let mut latest = traces
        .iter()
        .map(|trace| trace.is_empty().then_some(0))
        .collect::<Vec<_>>();
    let mut combined = Vec::new();
    for (elapsed, partition, value) in events {
        latest[partition] = Some(value);
        if let Some(total) = latest.iter().copied().sum::<Option<i64>>() {
            combined.push((elapsed, total));
        }
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traces_are_summed_once_every_partition_reported() {
        let ms = Duration::from_millis;
        let traces = vec![
            vec![(ms(1), 10), (ms(5), 8)],
            vec![(ms(3), 4)],
            vec![],
        ];

        assert_eq!(vec![(ms(3), 14), (ms(5), 12)], combine_traces(&traces));
    }

    #[test]
    fn a_modeling_error_wins_over_infeasibility() {
        let model = Model::default();
        let results = vec![
            Err(SchedulerError::Unstatable(1)),
            Err(SchedulerError::Infeasible),
            Err(ModelingError::new(&model, "broken").into()),
        ];

        let error = aggregate(&model, results).expect_err("no plan");
        assert!(matches!(error, SchedulerError::Modeling(_)));
    }

    #[test]
    fn infeasibility_wins_over_a_timeout() {
        let model = Model::default();
        let results = vec![
            Err(SchedulerError::Unstatable(1)),
            Err(SchedulerError::Infeasible),
        ];

        let error = aggregate(&model, results).expect_err("no plan");
        assert!(matches!(error, SchedulerError::Infeasible));
    }
}
