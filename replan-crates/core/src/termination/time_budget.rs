use super::TerminationCondition;
use crate::basic_types::time::Duration;
use crate::basic_types::time::Instant;

/// Stops the search once a deadline has passed.
///
/// Partitions solved concurrently share the same copy, so they all stop at the same moment.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
    deadline: Instant,
}

impl TimeBudget {
    /// A budget of `budget` from now on.
    pub fn starting_now(budget: Duration) -> TimeBudget {
        TimeBudget {
            deadline: Instant::now() + budget,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// The time left before the deadline, zero once it passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

impl TerminationCondition for TimeBudget {
    fn should_stop(&mut self) -> bool {
        Instant::now() >= self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_empty_budget_stops_immediately() {
        let mut budget = TimeBudget::starting_now(Duration::ZERO);

        assert!(budget.should_stop());
        assert_eq!(Duration::ZERO, budget.remaining());
    }

    #[test]
    fn a_large_budget_does_not_stop() {
        let mut budget = TimeBudget::starting_now(Duration::from_secs(3600));

        assert!(!budget.should_stop());
        assert!(budget.remaining() > Duration::from_secs(3500));
    }
}
