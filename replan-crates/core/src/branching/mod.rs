//! Contains the structures which decide how the search explores the space of assignments.
//!
//! A [`Brancher`] proposes the next [`Decision`], fixing one unfixed variable to a value. The
//! search asks the branchers in order through a [`DynamicBrancher`]: first the placement of the
//! VMs, then the state of the nodes, then the start times of the VM actions (leaves of the
//! movement graph first), and finally every remaining variable.
//!
//! The generic branchers are built from a [`VariableSelector`] and a [`ValueSelector`] combined
//! in an [`IndependentVariableValueBrancher`].
mod brancher;
pub(crate) mod branchers;
mod selection_context;
pub(crate) mod value_selection;
pub(crate) mod variable_selection;

pub(crate) use brancher::*;
pub(crate) use branchers::*;
pub(crate) use selection_context::SelectionContext;
pub(crate) use value_selection::*;
pub(crate) use variable_selection::*;

use crate::engine::variables::DomainId;

/// Fix `var` to `value`; on backtrack the value is removed from the domain instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Decision {
    pub(crate) var: DomainId,
    pub(crate) value: i32,
}

impl Decision {
    pub(crate) fn new(var: impl Into<DomainId>, value: i32) -> Decision {
        Decision {
            var: var.into(),
            value,
        }
    }
}
