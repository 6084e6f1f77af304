use super::PropagationContext;
use super::PropagationContextMut;
use crate::basic_types::PropagationStatus;

/// Filters the domains of the variables of one constraint.
///
/// Propagators are stored in the closed [`PropagatorKind`] enum, which forwards to this trait.
///
/// [`PropagatorKind`]: crate::propagators::PropagatorKind
pub(crate) trait Propagator {
    /// Used in log messages.
    fn name(&self) -> &str;

    /// Narrow the domains of the variables of the propagator until nothing more can be deduced.
    ///
    /// Propagation must be idempotent: invoking it a second time without any change to the domains
    /// in between must not narrow anything. Propagators are therefore not enqueued on the events
    /// they cause themselves.
    fn propagate(&mut self, context: PropagationContextMut) -> PropagationStatus;

    /// Whether the constraint is satisfied by every completion of the current domains
    /// ([`Entailment::True`]), by none of them ([`Entailment::False`]), or whether that cannot be
    /// stated yet.
    ///
    /// Entailed propagators are deactivated until the search backtracks above the world in which
    /// entailment was detected.
    fn is_entailed(&self, _context: PropagationContext) -> Entailment {
        Entailment::Undefined
    }

    /// Cheap propagators get a higher priority so that they run before the expensive ones.
    fn priority(&self) -> Priority {
        Priority::VeryLow
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Entailment {
    True,
    False,
    Undefined,
}

/// The queue a propagator waits in; [`Priority::High`] is emptied first.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub(crate) enum Priority {
    High = 0,
    Medium = 1,
    Low = 2,
    #[default]
    VeryLow = 3,
}

impl Priority {
    pub(crate) const NUM_LEVELS: usize = 4;
}
