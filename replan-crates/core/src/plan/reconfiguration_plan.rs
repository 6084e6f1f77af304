use std::fmt::Display;

use super::Action;
use crate::model::Model;

/// A set of timed actions that transforms an origin model.
///
/// Actions are kept sorted by start time, then by end time; actions with equal bounds keep their
/// insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconfigurationPlan {
    origin: Model,
    actions: Vec<Action>,
}

impl ReconfigurationPlan {
    pub fn new(origin: Model) -> ReconfigurationPlan {
        ReconfigurationPlan {
            origin,
            actions: Vec::new(),
        }
    }

    pub fn add(&mut self, action: Action) {
        let position = self
            .actions
            .partition_point(|other| (other.start, other.end) <= (action.start, action.end));
        self.actions.insert(position, action);
    }

    pub fn origin(&self) -> &Model {
        &self.origin
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The moment the last action ends.
    pub fn duration(&self) -> i32 {
        self.actions
            .iter()
            .map(|action| action.end)
            .max()
            .unwrap_or(0)
    }

    /// The model obtained by applying the actions on the origin model in order; `None` if an
    /// action can not be applied.
    pub fn result(&self) -> Option<Model> {
        let mut model = self.origin.clone();
        self.actions
            .iter()
            .all(|action| action.apply(&mut model))
            .then_some(model)
    }

    pub fn is_applicable(&self) -> bool {
        self.result().is_some()
    }

    /// Absorb the actions of `other`, which must transform a disjoint part of the datacenter.
    pub(crate) fn merge(&mut self, other: ReconfigurationPlan) {
        for action in other.actions {
            self.add(action);
        }
    }
}

impl Display for ReconfigurationPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for action in &self.actions {
            writeln!(f, "{action}")?;
        }
        Ok(())
    }
}
