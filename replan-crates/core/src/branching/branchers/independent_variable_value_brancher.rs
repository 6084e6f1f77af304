use crate::branching::Brancher;
use crate::branching::Decision;
use crate::branching::SelectionContext;
use crate::branching::ValueSelector;
use crate::branching::VariableSelector;

/// Branches on the variable chosen by a [`VariableSelector`], fixing it to the value chosen by a
/// [`ValueSelector`] which knows nothing about how the variable was picked.
#[derive(Debug)]
pub(crate) struct IndependentVariableValueBrancher<Variables, Values> {
    variables: Variables,
    values: Values,
}

impl<Variables, Values> IndependentVariableValueBrancher<Variables, Values>
where
    Variables: VariableSelector,
    Values: ValueSelector,
{
    pub(crate) fn new(variables: Variables, values: Values) -> Self {
        IndependentVariableValueBrancher { variables, values }
    }
}

impl<Variables, Values> Brancher for IndependentVariableValueBrancher<Variables, Values>
where
    Variables: VariableSelector + std::fmt::Debug,
    Values: ValueSelector + std::fmt::Debug,
{
    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Decision> {
        let variable = self.variables.select_variable(context)?;
        let value = self.values.select_value(context, variable);
        Some(Decision::new(variable, value))
    }
}
