use super::ValueSelector;
use crate::branching::SelectionContext;
use crate::containers::HashMap;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::DomainId;

/// [`ValueSelector`] which tries a value given per variable first, and the lower bound when the
/// value is gone from the domain or none was given.
#[derive(Debug, Default)]
pub(crate) struct PreferredValue {
    preferences: HashMap<DomainId, i32>,
}

impl PreferredValue {
    pub(crate) fn new(preferences: impl IntoIterator<Item = (DomainId, i32)>) -> Self {
        PreferredValue {
            preferences: preferences.into_iter().collect(),
        }
    }
}

impl ValueSelector for PreferredValue {
    fn select_value(&mut self, context: &mut SelectionContext, decision_variable: DomainId) -> i32 {
        self.preferences
            .get(&decision_variable)
            .copied()
            .filter(|&value| context.contains(decision_variable, value))
            .unwrap_or_else(|| context.lower_bound(decision_variable))
    }
}
