use super::TerminationCondition;

/// Stops as soon as either of its two conditions does, e.g. a partition's time budget together
/// with the flag raised when a sibling partition fails.
#[derive(Clone, Copy, Debug)]
pub struct Combinator<First, Second> {
    first: First,
    second: Second,
}

impl<First, Second> Combinator<First, Second> {
    pub fn new(first: First, second: Second) -> Self {
        Combinator { first, second }
    }
}

impl<First, Second> TerminationCondition for Combinator<First, Second>
where
    First: TerminationCondition,
    Second: TerminationCondition,
{
    fn should_stop(&mut self) -> bool {
        // Both are polled so stateful conditions see every check.
        let first = self.first.should_stop();
        let second = self.second.should_stop();
        first || second
    }

    fn decision_has_been_made(&mut self) {
        self.first.decision_has_been_made();
        self.second.decision_has_been_made();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::termination::DecisionBudget;
    use crate::termination::StopFlag;

    #[test]
    fn decisions_reach_both_conditions() {
        let flag = StopFlag::new();
        let mut combined = Combinator::new(DecisionBudget::new(1), flag.clone());

        assert!(!combined.should_stop());
        combined.decision_has_been_made();
        assert!(combined.should_stop());
    }

    #[test]
    fn the_second_condition_alone_stops() {
        let flag = StopFlag::new();
        let mut combined = Combinator::new(DecisionBudget::new(10), flag.clone());

        flag.raise();
        assert!(combined.should_stop());
    }
}
