use std::collections::BTreeSet;

use super::PlacementConstraint;
use super::SatConstraint;
use crate::model::Model;
use crate::model::Node;
use crate::model::Vm;
use crate::problem::ReconfigurationProblem;
use crate::scheduler::ModelingError;
use crate::scheduler::SchedulerError;

/// The action of `after` starts once the action of `before` has ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Precedence {
    pub before: Vm,
    pub after: Vm,
}

impl Precedence {
    pub fn new(before: Vm, after: Vm) -> Precedence {
        Precedence { before, after }
    }
}

impl PlacementConstraint for Precedence {
    fn involved_vms(&self) -> Vec<Vm> {
        vec![self.before, self.after]
    }

    fn involved_nodes(&self) -> Vec<Node> {
        Vec::new()
    }

    fn misplaced_vms(&self, _: &Model) -> BTreeSet<Vm> {
        BTreeSet::new()
    }

    // Ordering is a property of a plan; any model may be reached in order.
    fn is_satisfied(&self, _: &Model) -> bool {
        true
    }

    fn post(&self, problem: &mut ReconfigurationProblem<'_>) -> Result<(), SchedulerError> {
        let before = problem.vm_transition(self.before).map(|transition| transition.end);
        let after = problem.vm_transition(self.after).map(|transition| transition.start);
        match (before, after) {
            (Some(end), Some(start)) => {
                problem.post_linear_less_or_equal(vec![(1, end), (-1, start)], 0)
            }
            _ => {
                let (before, after) = (self.before, self.after);
                let message = format!("no transition to order {before} before {after}");
                Err(ModelingError::new(problem.model(), message).into())
            }
        }
    }

    fn is_splittable(&self) -> bool {
        false
    }

    fn restrict(&self, _: &BTreeSet<Vm>, _: &BTreeSet<Node>) -> Option<SatConstraint> {
        Some((*self).into())
    }
}
