use super::DomainId;

/// A boolean variable, backed by an integer variable with domain `{0, 1}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Literal {
    domain: DomainId,
}

impl Literal {
    pub(crate) fn new(domain: DomainId) -> Literal {
        Literal { domain }
    }

    pub(crate) fn domain_id(&self) -> DomainId {
        self.domain
    }
}

impl From<Literal> for DomainId {
    fn from(literal: Literal) -> Self {
        literal.domain
    }
}
