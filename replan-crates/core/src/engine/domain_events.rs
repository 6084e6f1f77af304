use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

/// How a domain was narrowed.
#[derive(Debug, EnumSetType, Hash)]
pub(crate) enum IntDomainEvent {
    /// Only one value is left.
    Assign,
    LowerBound,
    UpperBound,
    /// A hole was punched between the bounds.
    Removal,
}

/// The events a propagator subscribes to on one of its variables.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct DomainEvents {
    int_events: EnumSet<IntDomainEvent>,
}

impl DomainEvents {
    pub(crate) const ASSIGN: DomainEvents =
        DomainEvents::create_with_int_events(enum_set!(IntDomainEvent::Assign));
    pub(crate) const LOWER_BOUND: DomainEvents =
        DomainEvents::create_with_int_events(enum_set!(IntDomainEvent::LowerBound));
    pub(crate) const UPPER_BOUND: DomainEvents =
        DomainEvents::create_with_int_events(enum_set!(IntDomainEvent::UpperBound));
    /// Either bound moved; holes are ignored.
    pub(crate) const BOUNDS: DomainEvents = DomainEvents::create_with_int_events(enum_set!(
        IntDomainEvent::LowerBound | IntDomainEvent::UpperBound
    ));
    /// Every narrowing, holes included.
    pub(crate) const ANY_INT: DomainEvents = DomainEvents::create_with_int_events(enum_set!(
        IntDomainEvent::Assign
            | IntDomainEvent::LowerBound
            | IntDomainEvent::UpperBound
            | IntDomainEvent::Removal
    ));

    pub(crate) const fn create_with_int_events(
        int_events: EnumSet<IntDomainEvent>,
    ) -> DomainEvents {
        DomainEvents { int_events }
    }

    pub(crate) fn get_int_events(&self) -> EnumSet<IntDomainEvent> {
        self.int_events
    }
}
