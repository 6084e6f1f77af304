//! Conditions polled by the search before every decision to cut it short.
//!
//! A search stopped this way reports whatever it has found so far: the best plan, or an
//! unstatable outcome when there is none. The scheduler combines a [`TimeBudget`] derived from the
//! time limit with a [`StopFlag`] shared by all partitions.

mod combinator;
mod decision_budget;
mod indefinite;
mod stop_flag;
mod time_budget;

pub use combinator::*;
pub use decision_budget::*;
pub use indefinite::*;
pub use stop_flag::*;
pub use time_budget::*;

pub trait TerminationCondition {
    /// Whether the search has to give up now.
    fn should_stop(&mut self) -> bool;

    /// Notifies the condition that the search branched once more.
    fn decision_has_been_made(&mut self) {}
}

impl<Condition: TerminationCondition> TerminationCondition for Option<Condition> {
    fn should_stop(&mut self) -> bool {
        self.as_mut().is_some_and(TerminationCondition::should_stop)
    }

    fn decision_has_been_made(&mut self) {
        if let Some(condition) = self {
            condition.decision_has_been_made()
        }
    }
}
