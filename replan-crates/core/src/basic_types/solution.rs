use crate::containers::KeyedVec;
use crate::engine::variables::DomainId;
use crate::engine::variables::Literal;
use crate::engine::Assignments;

/// A complete assignment of the variables of a solving session, detached from the trail.
#[derive(Clone, Debug, Default)]
pub(crate) struct Solution {
    values: KeyedVec<DomainId, i32>,
}

impl Solution {
    /// Snapshot the lower bounds of every domain; in a solution they are all fixed.
    pub(crate) fn from_assignments(assignments: &Assignments) -> Solution {
        let mut values = KeyedVec::default();
        for domain in assignments.get_domains() {
            let _ = values.push(assignments.lower_bound(domain));
        }
        Solution { values }
    }

    pub(crate) fn value(&self, var: DomainId) -> i32 {
        self.values[var]
    }

    pub(crate) fn literal_value(&self, literal: Literal) -> bool {
        self.values[literal.domain_id()] == 1
    }
}
