use super::TerminationCondition;

/// Stops the search after a fixed number of decisions.
#[derive(Debug, Copy, Clone)]
pub struct DecisionBudget {
    remaining: u64,
}

impl DecisionBudget {
    pub fn new(max_decisions: u64) -> Self {
        DecisionBudget {
            remaining: max_decisions,
        }
    }
}

impl TerminationCondition for DecisionBudget {
    fn should_stop(&mut self) -> bool {
        self.remaining == 0
    }

    fn decision_has_been_made(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }
}
