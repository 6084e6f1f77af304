use std::fmt::Debug;
use std::ops::Range;

use rand::Rng;
use rand::SeedableRng;

/// The source of randomness used to break ties between equally good placements.
///
/// Any seedable generator from `rand` qualifies; tests script the draws instead.
pub trait Random: Debug {
    /// Draws uniformly from `range`, which must not be empty.
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize;
}

impl<Generator> Random for Generator
where
    Generator: SeedableRng + Rng + Debug,
{
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
        self.gen_range(range)
    }
}
