use super::domain_events::IntDomainEvent;
use super::event_sink::EventSink;
use super::trailed::TrailedInteger;
use super::trailed::TrailedValues;
use super::variables::DomainId;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::replan_assert_moderate;
use crate::replan_assert_simple;

/// Returned when a narrowing would leave a domain without any value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct EmptyDomain;

const WORD_SIZE: i32 = 64;

/// The backing cells of one integer variable.
#[derive(Clone, Copy, Debug)]
struct IntegerDomain {
    lower_bound: TrailedInteger,
    upper_bound: TrailedInteger,
    size: TrailedInteger,
    /// The value represented by bit 0 of the first word.
    offset: i32,
    /// First word and number of words of the bitset, for enumerated domains.
    words: Option<(TrailedInteger, u32)>,
}

/// The domains of all the integer variables of a solving session.
///
/// Domains are either bounded intervals, where only the bounds can change, or enumerated sets
/// stored as a bitset over the initial range. All state lives in [`TrailedValues`] so every
/// narrowing is undone when the world it happened in is popped.
#[derive(Clone, Debug, Default)]
pub(crate) struct Assignments {
    trailed_values: TrailedValues,
    domains: KeyedVec<DomainId, IntegerDomain>,
}

impl Assignments {
    /// Create a bounded domain `[lower_bound, upper_bound]`.
    pub(crate) fn grow(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        replan_assert_simple!(lower_bound <= upper_bound, "cannot create an empty domain");

        let domain = IntegerDomain {
            lower_bound: self.trailed_values.grow(lower_bound as i64),
            upper_bound: self.trailed_values.grow(upper_bound as i64),
            size: self
                .trailed_values
                .grow(upper_bound as i64 - lower_bound as i64 + 1),
            offset: lower_bound,
            words: None,
        };
        self.domains.push(domain)
    }

    /// Create an enumerated domain holding exactly `values`.
    pub(crate) fn grow_enumerated(&mut self, values: &[i32]) -> DomainId {
        replan_assert_simple!(!values.is_empty(), "cannot create an empty domain");

        let lower_bound = values.iter().copied().min().unwrap_or_default();
        let upper_bound = values.iter().copied().max().unwrap_or_default();
        let num_words = ((upper_bound - lower_bound) / WORD_SIZE + 1) as usize;

        let mut bits = vec![0_u64; num_words];
        for &value in values {
            let offset = value - lower_bound;
            bits[(offset / WORD_SIZE) as usize] |= 1_u64 << (offset % WORD_SIZE);
        }
        let size = bits.iter().map(|word| word.count_ones() as i64).sum();

        let first_word = self.trailed_values.grow(bits[0] as i64);
        for &word in &bits[1..] {
            let _ = self.trailed_values.grow(word as i64);
        }

        let domain = IntegerDomain {
            lower_bound: self.trailed_values.grow(lower_bound as i64),
            upper_bound: self.trailed_values.grow(upper_bound as i64),
            size: self.trailed_values.grow(size),
            offset: lower_bound,
            words: Some((first_word, num_words as u32)),
        };
        self.domains.push(domain)
    }

    pub(crate) fn num_domains(&self) -> usize {
        self.domains.len()
    }

    pub(crate) fn get_domains(&self) -> impl Iterator<Item = DomainId> {
        self.domains.keys()
    }

    pub(crate) fn new_trailed_integer(&mut self, initial_value: i64) -> TrailedInteger {
        self.trailed_values.grow(initial_value)
    }

    pub(crate) fn read_trailed_integer(&self, trailed_integer: TrailedInteger) -> i64 {
        self.trailed_values.read(trailed_integer)
    }

    pub(crate) fn assign_trailed_integer(&mut self, trailed_integer: TrailedInteger, value: i64) {
        self.trailed_values.assign(trailed_integer, value)
    }

    pub(crate) fn current_world(&self) -> usize {
        self.trailed_values.current_world()
    }

    pub(crate) fn push_world(&mut self) {
        self.trailed_values.push_world()
    }

    pub(crate) fn pop_world(&mut self) {
        self.trailed_values.pop_world()
    }

    pub(crate) fn commit_world(&mut self) {
        self.trailed_values.commit_world()
    }

    pub(crate) fn lower_bound(&self, domain: DomainId) -> i32 {
        self.trailed_values.read(self.domains[domain].lower_bound) as i32
    }

    pub(crate) fn upper_bound(&self, domain: DomainId) -> i32 {
        self.trailed_values.read(self.domains[domain].upper_bound) as i32
    }

    pub(crate) fn size(&self, domain: DomainId) -> u32 {
        self.trailed_values.read(self.domains[domain].size) as u32
    }

    pub(crate) fn is_fixed(&self, domain: DomainId) -> bool {
        self.lower_bound(domain) == self.upper_bound(domain)
    }

    pub(crate) fn fixed_value(&self, domain: DomainId) -> Option<i32> {
        self.is_fixed(domain).then(|| self.lower_bound(domain))
    }

    pub(crate) fn contains(&self, domain: DomainId, value: i32) -> bool {
        if value < self.lower_bound(domain) || value > self.upper_bound(domain) {
            return false;
        }
        self.bit_is_set(domain, value)
    }

    /// Iterate over the values of the domain, in increasing order.
    pub(crate) fn iterate_domain(&self, domain: DomainId) -> impl Iterator<Item = i32> + '_ {
        let upper_bound = self.upper_bound(domain);
        let mut next = Some(self.lower_bound(domain));
        std::iter::from_fn(move || {
            let current = next?;
            next = if current >= upper_bound {
                None
            } else {
                self.next_present(domain, current + 1, upper_bound)
            };
            Some(current)
        })
    }

    /// Raise the lower bound of the domain to at least `value`.
    ///
    /// Returns whether the domain changed.
    pub(crate) fn tighten_lower_bound(
        &mut self,
        domain: DomainId,
        value: i32,
        events: &mut EventSink,
    ) -> Result<bool, EmptyDomain> {
        let lower_bound = self.lower_bound(domain);
        let upper_bound = self.upper_bound(domain);
        if value <= lower_bound {
            return Ok(false);
        }
        if value > upper_bound {
            return Err(EmptyDomain);
        }

        let new_lower_bound = self
            .next_present(domain, value, upper_bound)
            .ok_or(EmptyDomain)?;
        let removed = self.count_present(domain, lower_bound, new_lower_bound - 1);

        let cells = self.domains[domain];
        self.trailed_values
            .assign(cells.lower_bound, new_lower_bound as i64);
        self.trailed_values.add_assign(cells.size, -removed);

        events.event_occurred(IntDomainEvent::LowerBound, domain);
        if new_lower_bound == upper_bound {
            events.event_occurred(IntDomainEvent::Assign, domain);
        }
        self.debug_check_size(domain);
        Ok(true)
    }

    /// Lower the upper bound of the domain to at most `value`.
    ///
    /// Returns whether the domain changed.
    pub(crate) fn tighten_upper_bound(
        &mut self,
        domain: DomainId,
        value: i32,
        events: &mut EventSink,
    ) -> Result<bool, EmptyDomain> {
        let lower_bound = self.lower_bound(domain);
        let upper_bound = self.upper_bound(domain);
        if value >= upper_bound {
            return Ok(false);
        }
        if value < lower_bound {
            return Err(EmptyDomain);
        }

        let new_upper_bound = self
            .previous_present(domain, value, lower_bound)
            .ok_or(EmptyDomain)?;
        let removed = self.count_present(domain, new_upper_bound + 1, upper_bound);

        let cells = self.domains[domain];
        self.trailed_values
            .assign(cells.upper_bound, new_upper_bound as i64);
        self.trailed_values.add_assign(cells.size, -removed);

        events.event_occurred(IntDomainEvent::UpperBound, domain);
        if new_upper_bound == lower_bound {
            events.event_occurred(IntDomainEvent::Assign, domain);
        }
        self.debug_check_size(domain);
        Ok(true)
    }

    /// Remove `value` from the domain.
    ///
    /// Interior values of bounded domains cannot be represented as holes; removing them leaves
    /// the domain unchanged.
    pub(crate) fn remove_value(
        &mut self,
        domain: DomainId,
        value: i32,
        events: &mut EventSink,
    ) -> Result<bool, EmptyDomain> {
        if !self.contains(domain, value) {
            return Ok(false);
        }

        let lower_bound = self.lower_bound(domain);
        let upper_bound = self.upper_bound(domain);
        if lower_bound == upper_bound {
            return Err(EmptyDomain);
        }
        if value == lower_bound {
            return self.tighten_lower_bound(domain, value + 1, events);
        }
        if value == upper_bound {
            return self.tighten_upper_bound(domain, value - 1, events);
        }

        let cells = self.domains[domain];
        let Some((word, bit)) = self.word_of(domain, value) else {
            return Ok(false);
        };
        let current = self.trailed_values.read(word) as u64;
        self.trailed_values
            .assign(word, (current & !(1_u64 << bit)) as i64);
        self.trailed_values.add_assign(cells.size, -1);

        events.event_occurred(IntDomainEvent::Removal, domain);
        self.debug_check_size(domain);
        Ok(true)
    }

    /// Reduce the domain to the single value `value`.
    pub(crate) fn instantiate_to(
        &mut self,
        domain: DomainId,
        value: i32,
        events: &mut EventSink,
    ) -> Result<bool, EmptyDomain> {
        if !self.contains(domain, value) {
            return Err(EmptyDomain);
        }
        if self.is_fixed(domain) {
            return Ok(false);
        }

        let _ = self.tighten_lower_bound(domain, value, events)?;
        let _ = self.tighten_upper_bound(domain, value, events)?;
        Ok(true)
    }

    fn word_of(&self, domain: DomainId, value: i32) -> Option<(TrailedInteger, u32)> {
        let cells = &self.domains[domain];
        let (first_word, _) = cells.words?;
        let offset = value - cells.offset;
        // The words of a bitset are allocated contiguously.
        let word =
            TrailedInteger::create_from_index(first_word.index() + (offset / WORD_SIZE) as usize);
        Some((word, (offset % WORD_SIZE) as u32))
    }

    fn bit_is_set(&self, domain: DomainId, value: i32) -> bool {
        match self.word_of(domain, value) {
            None => true,
            Some((word, bit)) => (self.trailed_values.read(word) as u64 >> bit) & 1 == 1,
        }
    }

    /// The smallest present value in `[from, upper_bound]`, ignoring the current lower bound.
    fn next_present(&self, domain: DomainId, from: i32, upper_bound: i32) -> Option<i32> {
        let cells = &self.domains[domain];
        if cells.words.is_none() {
            return (from <= upper_bound).then_some(from);
        }

        let mut value = from;
        while value <= upper_bound {
            let (word, bit) = self.word_of(domain, value)?;
            let remaining = (self.trailed_values.read(word) as u64) >> bit;
            if remaining != 0 {
                let candidate = value + remaining.trailing_zeros() as i32;
                return (candidate <= upper_bound).then_some(candidate);
            }
            value += WORD_SIZE - bit as i32;
        }
        None
    }

    /// The largest present value in `[lower_bound, from]`, ignoring the current upper bound.
    fn previous_present(&self, domain: DomainId, from: i32, lower_bound: i32) -> Option<i32> {
        let cells = &self.domains[domain];
        if cells.words.is_none() {
            return (from >= lower_bound).then_some(from);
        }

        let mut value = from;
        while value >= lower_bound {
            let (word, bit) = self.word_of(domain, value)?;
            let remaining = (self.trailed_values.read(word) as u64) << (WORD_SIZE as u32 - 1 - bit);
            if remaining != 0 {
                let candidate = value - remaining.leading_zeros() as i32;
                return (candidate >= lower_bound).then_some(candidate);
            }
            value -= bit as i32 + 1;
        }
        None
    }

    /// The number of present values in `[from, to]`.
    fn count_present(&self, domain: DomainId, from: i32, to: i32) -> i64 {
        if from > to {
            return 0;
        }
        let cells = &self.domains[domain];
        if cells.words.is_none() {
            return to as i64 - from as i64 + 1;
        }

        let mut count = 0;
        let mut value = from;
        while value <= to {
            let Some((word, bit)) = self.word_of(domain, value) else {
                break;
            };
            let span = (WORD_SIZE - bit as i32).min(to - value + 1) as u32;
            let mask = if span == 64 {
                u64::MAX
            } else {
                ((1_u64 << span) - 1) << bit
            };
            count += ((self.trailed_values.read(word) as u64) & mask).count_ones() as i64;
            value += span as i32;
        }
        count
    }

    fn debug_check_size(&self, domain: DomainId) {
        replan_assert_moderate!(
            self.size(domain) as i64
                == self.count_present(domain, self.lower_bound(domain), self.upper_bound(domain)),
            "the cached size of {domain} is out of sync"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink_for(assignments: &Assignments) -> EventSink {
        let mut sink = EventSink::default();
        for _ in 0..assignments.num_domains() {
            sink.grow();
        }
        sink
    }

    #[test]
    fn bounded_domains_ignore_interior_removals() {
        let mut assignments = Assignments::default();
        let x = assignments.grow(0, 10);
        let mut sink = sink_for(&assignments);

        assert_eq!(Ok(false), assignments.remove_value(x, 5, &mut sink));
        assert_eq!(Ok(true), assignments.remove_value(x, 0, &mut sink));
        assert_eq!(1, assignments.lower_bound(x));
        assert_eq!(10, assignments.size(x));
    }

    #[test]
    fn enumerated_bounds_skip_holes() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_enumerated(&[1, 3, 70, 130]);
        let mut sink = sink_for(&assignments);

        assert_eq!(4, assignments.size(x));
        assert!(!assignments.contains(x, 2));

        assert_eq!(Ok(true), assignments.tighten_lower_bound(x, 4, &mut sink));
        assert_eq!(70, assignments.lower_bound(x));
        assert_eq!(2, assignments.size(x));

        assert_eq!(Ok(true), assignments.tighten_upper_bound(x, 129, &mut sink));
        assert_eq!(70, assignments.upper_bound(x));
        assert!(assignments.is_fixed(x));
    }

    #[test]
    fn removing_the_last_value_is_an_empty_domain() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_enumerated(&[4]);
        let mut sink = sink_for(&assignments);

        assert_eq!(Err(EmptyDomain), assignments.remove_value(x, 4, &mut sink));
        assert_eq!(
            Err(EmptyDomain),
            assignments.tighten_lower_bound(x, 5, &mut sink)
        );
    }

    #[test]
    fn removal_raises_events() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_enumerated(&[0, 1, 2]);
        let mut sink = sink_for(&assignments);

        let _ = assignments.remove_value(x, 1, &mut sink);
        let _ = assignments.remove_value(x, 0, &mut sink);

        let events = sink.drain().map(|(event, _)| event).collect::<Vec<_>>();
        assert_eq!(
            vec![
                IntDomainEvent::Removal,
                IntDomainEvent::LowerBound,
                IntDomainEvent::Assign
            ],
            events
        );
    }

    #[test]
    fn iterate_domain_lists_present_values() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_enumerated(&[0, 1, 2, 63, 64, 65, 200]);
        let mut sink = sink_for(&assignments);
        let _ = assignments.remove_value(x, 64, &mut sink);

        assert_eq!(
            vec![0, 1, 2, 63, 65, 200],
            assignments.iterate_domain(x).collect::<Vec<_>>()
        );
    }

    #[test]
    fn popping_a_world_restores_the_domain() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_enumerated(&[0, 1, 2, 3]);
        let mut sink = sink_for(&assignments);

        assignments.push_world();
        let _ = assignments.remove_value(x, 2, &mut sink);
        let _ = assignments.instantiate_to(x, 1, &mut sink);
        assert_eq!(Some(1), assignments.fixed_value(x));

        assignments.pop_world();
        assert_eq!(4, assignments.size(x));
        assert_eq!(
            vec![0, 1, 2, 3],
            assignments.iterate_domain(x).collect::<Vec<_>>()
        );
    }

    #[test]
    fn instantiating_to_a_missing_value_fails() {
        let mut assignments = Assignments::default();
        let x = assignments.grow_enumerated(&[0, 2]);
        let mut sink = sink_for(&assignments);

        assert_eq!(Err(EmptyDomain), assignments.instantiate_to(x, 1, &mut sink));
    }
}
