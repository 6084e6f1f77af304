use enum_map::EnumMap;

use super::ModelingError;
use crate::model::Element;
use crate::model::Model;
use crate::plan::ActionType;

/// Estimates how long an action takes on an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DurationEvaluator {
    /// Every action lasts the same time.
    Constant(i32),
    /// The duration is read from the integer attribute `key` of the element, `default` if unset.
    FromAttribute { key: String, default: i32 },
}

impl DurationEvaluator {
    pub fn evaluate(&self, model: &Model, element: Element) -> i32 {
        match self {
            DurationEvaluator::Constant(duration) => *duration,
            DurationEvaluator::FromAttribute { key, default } => model
                .attributes()
                .get_integer(element, key)
                .unwrap_or(*default),
        }
    }
}

/// The [`DurationEvaluator`] used for each [`ActionType`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DurationEvaluators {
    evaluators: EnumMap<ActionType, Option<DurationEvaluator>>,
}

impl Default for DurationEvaluators {
    /// Every action type reads the attribute named after it, with a default duration of 1.
    fn default() -> Self {
        DurationEvaluators {
            evaluators: EnumMap::from_fn(|action_type: ActionType| {
                Some(DurationEvaluator::FromAttribute {
                    key: action_type.attribute_key().to_owned(),
                    default: 1,
                })
            }),
        }
    }
}

impl DurationEvaluators {
    /// A bundle without any evaluator.
    pub fn empty() -> Self {
        DurationEvaluators {
            evaluators: EnumMap::default(),
        }
    }

    /// Register `evaluator` for `action_type`, returning the evaluator it replaces.
    pub fn register(
        &mut self,
        action_type: ActionType,
        evaluator: DurationEvaluator,
    ) -> Option<DurationEvaluator> {
        self.evaluators[action_type].replace(evaluator)
    }

    pub fn unregister(&mut self, action_type: ActionType) -> Option<DurationEvaluator> {
        self.evaluators[action_type].take()
    }

    pub fn get(&self, action_type: ActionType) -> Option<&DurationEvaluator> {
        self.evaluators[action_type].as_ref()
    }

    /// The duration of an action of type `action_type` on `element`.
    ///
    /// Fails when no evaluator is registered or the duration is not strictly positive.
    pub fn evaluate(
        &self,
        model: &Model,
        action_type: ActionType,
        element: impl Into<Element>,
    ) -> Result<i32, ModelingError> {
        let element = element.into();
        let Some(evaluator) = self.get(action_type) else {
            return Err(ModelingError::new(
                model,
                format!("no duration evaluator registered for {action_type:?}"),
            ));
        };

        let duration = evaluator.evaluate(model, element);
        if duration <= 0 {
            return Err(ModelingError::new(
                model,
                format!(
                    "the duration of {action_type:?} on {element} must be positive, got {duration}"
                ),
            ));
        }
        Ok(duration)
    }
}
