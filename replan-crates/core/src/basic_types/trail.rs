use std::iter::Rev;
use std::ops::Deref;
use std::vec::Drain;

use crate::replan_assert_simple;

/// An append-only undo log partitioned into worlds.
///
/// World `0` is the root; every call to [`Trail::push_world`] opens a new world on top of the
/// current one. Entries recorded while a world is open belong to that world and are handed back in
/// reverse chronological order when the world is popped.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    /// At index i is the position where world i + 1 starts on the trail.
    world_start_levels: Vec<usize>,
    trail: Vec<T>,
}

// Derived Default would require `T: Default`.
impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            world_start_levels: Default::default(),
            trail: Default::default(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn push_world(&mut self) {
        self.world_start_levels.push(self.trail.len());
    }

    pub(crate) fn current_world(&self) -> usize {
        self.world_start_levels.len()
    }

    /// Remove the current world, returning its entries from newest to oldest.
    pub(crate) fn pop_world(&mut self) -> Rev<Drain<'_, T>> {
        replan_assert_simple!(self.current_world() > 0, "cannot pop the root world");

        let start = self.world_start_levels.pop().unwrap_or(0);
        self.trail.drain(start..).rev()
    }

    /// Merge the current world into its parent.
    ///
    /// Every entry of the committed world is passed to `keep`, oldest first. Entries for which it
    /// returns `false` are dropped; the others stay on the trail in their original order and now
    /// belong to the parent world.
    pub(crate) fn commit_world(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        replan_assert_simple!(self.current_world() > 0, "cannot commit the root world");

        let start = self.world_start_levels.pop().unwrap_or(0);
        let mut kept = start;
        for index in start..self.trail.len() {
            if keep(&mut self.trail[index]) {
                self.trail.swap(kept, index);
                kept += 1;
            }
        }
        self.trail.truncate(kept);
    }

    /// Append an entry to the current world.
    pub(crate) fn record(&mut self, entry: T) {
        if self.trail.len() == self.trail.capacity() {
            // Grow by half of the current size rather than doubling.
            let additional = (self.trail.capacity() / 2).max(16);
            self.trail.reserve_exact(additional);
        }
        self.trail.push(entry)
    }

    #[cfg(test)]
    pub(crate) fn entries_in_world(&self, world: usize) -> &[T] {
        replan_assert_simple!(world <= self.current_world());

        let start = if world == 0 {
            0
        } else {
            self.world_start_levels[world - 1]
        };
        let end = if world == self.current_world() {
            self.trail.len()
        } else {
            self.world_start_levels[world]
        };

        &self.trail[start..end]
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_values_are_observed_through_indexing() {
        let mut trail = Trail::default();

        let expected = [1, 2, 3, 4];
        for &elem in expected.iter() {
            trail.record(elem);
        }

        assert_eq!(&expected, trail.deref());
    }

    #[test]
    fn popping_a_world_returns_its_entries_newest_first() {
        let mut trail = Trail::default();
        trail.record(1);

        trail.push_world();
        trail.record(2);
        trail.record(3);

        let popped = trail.pop_world().collect::<Vec<_>>();

        assert_eq!(vec![3, 2], popped);
        assert_eq!(&[1], trail.deref());
        assert_eq!(0, trail.current_world());
    }

    #[test]
    fn committing_keeps_selected_entries_in_the_parent() {
        let mut trail = Trail::default();
        trail.push_world();
        trail.record(1);
        trail.push_world();
        trail.record(2);
        trail.record(3);
        trail.record(4);

        trail.commit_world(|entry| *entry % 2 == 0);

        assert_eq!(1, trail.current_world());
        assert_eq!(&[1, 2, 4], trail.entries_in_world(1));
    }

    #[test]
    fn committing_compacts_the_trail_in_place() {
        let mut trail = Trail::default();
        trail.record(0);
        trail.push_world();
        for i in 1..=20 {
            trail.record(i);
        }
        let capacity = trail.trail.capacity();
        let mut seen = Vec::new();

        trail.commit_world(|entry| {
            seen.push(*entry);
            *entry % 3 != 0
        });

        assert_eq!((1..=20).collect::<Vec<_>>(), seen);
        assert_eq!(capacity, trail.trail.capacity());
        assert_eq!(0, trail.current_world());
        assert_eq!(
            &[0, 1, 2, 4, 5, 7, 8, 10, 11, 13, 14, 16, 17, 19, 20],
            trail.deref()
        );
    }

    #[test]
    fn entries_in_world_are_delimited() {
        let mut trail = Trail::default();
        trail.record(0);
        trail.push_world();
        trail.record(1);
        trail.push_world();
        trail.push_world();
        trail.record(3);

        assert_eq!(&[0], trail.entries_in_world(0));
        assert_eq!(&[1], trail.entries_in_world(1));
        assert!(trail.entries_in_world(2).is_empty());
        assert_eq!(&[3], trail.entries_in_world(3));
    }

    #[test]
    fn capacity_grows_without_losing_entries() {
        let mut trail = Trail::default();
        for i in 0..1000 {
            trail.record(i);
        }

        assert_eq!(1000, trail.len());
        assert_eq!(999, trail[999]);
    }
}
