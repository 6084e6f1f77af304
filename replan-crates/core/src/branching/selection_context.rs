use crate::basic_types::Random;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::Assignments;

/// The context given to a [`Brancher`](super::Brancher): read access to the domains and the
/// random generator of the search.
#[derive(Debug)]
pub(crate) struct SelectionContext<'a> {
    domains: PropagationContext<'a>,
    random: &'a mut dyn Random,
}

impl<'a> SelectionContext<'a> {
    pub(crate) fn new(domains: PropagationContext<'a>, random: &'a mut dyn Random) -> Self {
        SelectionContext { domains, random }
    }

    pub(crate) fn random(&mut self) -> &mut dyn Random {
        self.random
    }
}

impl ReadDomains for SelectionContext<'_> {
    fn assignments(&self) -> &Assignments {
        self.domains.assignments()
    }
}
