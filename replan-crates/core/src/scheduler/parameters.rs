use std::num::NonZeroUsize;
use std::thread::available_parallelism;

use super::DurationEvaluators;
use crate::basic_types::time::Duration;

/// The options of a scheduling session.
#[derive(Clone, Debug)]
pub struct SchedulerParameters {
    /// The wall-clock budget of the search; unlimited when `None`.
    pub time_limit: Option<Duration>,
    /// Keep searching for better plans after the first one, up to proving optimality.
    pub optimise: bool,
    /// Only manage the VMs the constraints consider misplaced; the others keep their placement.
    pub repair: bool,
    /// The latest moment an action may end.
    pub max_end: i32,
    /// Seed of the random placement heuristic.
    pub random_seed: u64,
    /// Place VMs on random nodes rather than on the least loaded ones.
    pub random_placement: bool,
    /// The number of partitions solved concurrently.
    pub workers: usize,
    pub durations: DurationEvaluators,
}

impl Default for SchedulerParameters {
    fn default() -> Self {
        SchedulerParameters {
            time_limit: None,
            optimise: false,
            repair: false,
            max_end: 3600,
            random_seed: 0,
            random_placement: false,
            workers: available_parallelism().map_or(1, NonZeroUsize::get),
            durations: DurationEvaluators::default(),
        }
    }
}

impl SchedulerParameters {
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn with_optimisation(mut self, optimise: bool) -> Self {
        self.optimise = optimise;
        self
    }

    pub fn with_repair(mut self, repair: bool) -> Self {
        self.repair = repair;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_durations(mut self, durations: DurationEvaluators) -> Self {
        self.durations = durations;
        self
    }
}
