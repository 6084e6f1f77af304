use thiserror::Error;

use crate::model::Model;

/// The ways in which the scheduler can fail to produce a plan.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The search space was exhausted without finding a plan.
    #[error("no reconfiguration plan satisfies the constraints")]
    Infeasible,
    /// The time limit expired before a plan was found or the instance proven infeasible.
    #[error("no plan was found within the time limit of {0}s")]
    Unstatable(u64),
    #[error(transparent)]
    Modeling(#[from] ModelingError),
}

/// A structural problem of the instance, detected before the search starts.
#[derive(Debug, Error)]
#[error("unable to model the instance: {message}")]
pub struct ModelingError {
    model: Box<Model>,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ModelingError {
    pub fn new(model: &Model, message: impl Into<String>) -> ModelingError {
        ModelingError {
            model: Box::new(model.clone()),
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        model: &Model,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> ModelingError {
        ModelingError {
            model: Box::new(model.clone()),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The model that could not be handled.
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
