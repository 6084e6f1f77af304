use crate::engine::variables::DomainId;
use crate::engine::variables::Literal;
use crate::engine::Assignments;
use crate::engine::EmptyDomain;
use crate::engine::EventSink;

/// Read access to the domains of the variables.
pub(crate) trait ReadDomains {
    fn assignments(&self) -> &Assignments;

    fn lower_bound(&self, var: DomainId) -> i32 {
        self.assignments().lower_bound(var)
    }

    fn upper_bound(&self, var: DomainId) -> i32 {
        self.assignments().upper_bound(var)
    }

    fn size(&self, var: DomainId) -> u32 {
        self.assignments().size(var)
    }

    fn contains(&self, var: DomainId, value: i32) -> bool {
        self.assignments().contains(var, value)
    }

    fn is_fixed(&self, var: DomainId) -> bool {
        self.assignments().is_fixed(var)
    }

    fn fixed_value(&self, var: DomainId) -> Option<i32> {
        self.assignments().fixed_value(var)
    }

    fn iterate_domain(&self, var: DomainId) -> impl Iterator<Item = i32> + '_ {
        self.assignments().iterate_domain(var)
    }

    fn is_true(&self, literal: Literal) -> bool {
        self.lower_bound(literal.domain_id()) == 1
    }

    fn is_false(&self, literal: Literal) -> bool {
        self.upper_bound(literal.domain_id()) == 0
    }
}

/// [`PropagationContext`] is passed to propagators when they only need to observe the domains,
/// e.g. to check entailment.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PropagationContext<'a> {
    assignments: &'a Assignments,
}

impl<'a> PropagationContext<'a> {
    pub(crate) fn new(assignments: &'a Assignments) -> Self {
        PropagationContext { assignments }
    }
}

impl ReadDomains for PropagationContext<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }
}

/// [`PropagationContextMut`] is passed to propagators during propagation.
///
/// It is the only point of communication between the propagators and the solver during
/// propagation: every narrowing goes through it so the change is trailed and the matching domain
/// events are raised.
#[derive(Debug)]
pub(crate) struct PropagationContextMut<'a> {
    assignments: &'a mut Assignments,
    events: &'a mut EventSink,
}

impl<'a> PropagationContextMut<'a> {
    pub(crate) fn new(assignments: &'a mut Assignments, events: &'a mut EventSink) -> Self {
        PropagationContextMut {
            assignments,
            events,
        }
    }

    pub(crate) fn set_lower_bound(
        &mut self,
        var: DomainId,
        value: i32,
    ) -> Result<bool, EmptyDomain> {
        self.assignments.tighten_lower_bound(var, value, self.events)
    }

    pub(crate) fn set_upper_bound(
        &mut self,
        var: DomainId,
        value: i32,
    ) -> Result<bool, EmptyDomain> {
        self.assignments.tighten_upper_bound(var, value, self.events)
    }

    pub(crate) fn remove(&mut self, var: DomainId, value: i32) -> Result<bool, EmptyDomain> {
        self.assignments.remove_value(var, value, self.events)
    }

    pub(crate) fn instantiate(&mut self, var: DomainId, value: i32) -> Result<bool, EmptyDomain> {
        self.assignments.instantiate_to(var, value, self.events)
    }

    pub(crate) fn set_literal(
        &mut self,
        literal: Literal,
        value: bool,
    ) -> Result<bool, EmptyDomain> {
        self.instantiate(literal.domain_id(), value as i32)
    }
}

impl ReadDomains for PropagationContextMut<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }
}
