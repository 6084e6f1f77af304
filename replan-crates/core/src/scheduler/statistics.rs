use std::fmt::Display;
use std::fmt::Formatter;

use crate::basic_types::time::Duration;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

/// How good the returned plan is known to be.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolvingStatus {
    /// No plan has a smaller objective.
    #[default]
    Optimal,
    /// The search stopped at the first plan, or ran out of time before proving the plan optimal.
    Satisfiable,
}

impl Display for SolvingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SolvingStatus::Optimal => write!(f, "OPTIMAL"),
            SolvingStatus::Satisfiable => write!(f, "SATISFIABLE"),
        }
    }
}

/// What happened while solving an instance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolvingStatistics {
    pub num_nodes: usize,
    pub num_vms: usize,
    pub num_partitions: usize,
    pub num_decisions: u64,
    /// The number of refuted decisions.
    pub num_backtracks: u64,
    pub num_solutions: u64,
    pub peak_depth: u64,
    pub solving_time: Duration,
    /// When each improving solution was found, and its objective value.
    pub objective_trace: Vec<(Duration, i64)>,
    pub status: SolvingStatus,
}

impl SolvingStatistics {
    /// Fold the statistics of a partition solved alongside this one.
    ///
    /// Only the counters are combined; the objective trace and the timing are left to the caller,
    /// which knows how the partitions overlap in time.
    pub(crate) fn merge_counters(&mut self, other: &SolvingStatistics) {
        self.num_nodes += other.num_nodes;
        self.num_vms += other.num_vms;
        self.num_partitions += other.num_partitions;
        self.num_decisions += other.num_decisions;
        self.num_backtracks += other.num_backtracks;
        self.num_solutions += other.num_solutions;
        self.peak_depth = self.peak_depth.max(other.peak_depth);
        if other.status == SolvingStatus::Satisfiable {
            self.status = SolvingStatus::Satisfiable;
        }
    }

    /// The objective value of the returned plan.
    pub fn objective(&self) -> Option<i64> {
        self.objective_trace.last().map(|&(_, value)| value)
    }
}

impl Statistic for SolvingStatistics {
    fn log(&self, statistic_logger: StatisticLogger) {
        self.num_nodes
            .log(statistic_logger.attach_to_prefix("num_nodes"));
        self.num_vms.log(statistic_logger.attach_to_prefix("num_vms"));
        self.num_partitions
            .log(statistic_logger.attach_to_prefix("num_partitions"));
        self.num_decisions
            .log(statistic_logger.attach_to_prefix("num_decisions"));
        self.num_backtracks
            .log(statistic_logger.attach_to_prefix("num_backtracks"));
        self.num_solutions
            .log(statistic_logger.attach_to_prefix("num_solutions"));
        self.peak_depth
            .log(statistic_logger.attach_to_prefix("peak_depth"));
        self.solving_time
            .as_millis()
            .log(statistic_logger.attach_to_prefix("solving_time_ms"));
        if let Some(objective) = self.objective() {
            objective.log(statistic_logger.attach_to_prefix("objective"));
        }
        self.status.log(statistic_logger.attach_to_prefix("status"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merging_sums_counters_and_keeps_the_weakest_status() {
        let mut statistics = SolvingStatistics {
            num_decisions: 3,
            peak_depth: 7,
            num_partitions: 1,
            ..Default::default()
        };
        let other = SolvingStatistics {
            num_decisions: 4,
            peak_depth: 2,
            num_partitions: 1,
            status: SolvingStatus::Satisfiable,
            ..Default::default()
        };

        statistics.merge_counters(&other);
        assert_eq!(7, statistics.num_decisions);
        assert_eq!(7, statistics.peak_depth);
        assert_eq!(2, statistics.num_partitions);
        assert_eq!(SolvingStatus::Satisfiable, statistics.status);
    }
}
