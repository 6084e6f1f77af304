use super::TrailedChange;
use super::TrailedInteger;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;
use crate::replan_assert_moderate;

/// Integer cells whose writes can be undone world by world.
///
/// Every cell remembers the world in which it was last saved (its stamp). The first write to a
/// cell in a world saves its previous value and stamp on the trail; later writes in the same world
/// overwrite in place. Writes performed in world `0` are permanent.
#[derive(Default, Debug, Clone)]
pub(crate) struct TrailedValues {
    trail: Trail<TrailedChange>,
    values: KeyedVec<TrailedInteger, i64>,
    stamps: KeyedVec<TrailedInteger, usize>,
}

impl TrailedValues {
    pub(crate) fn grow(&mut self, initial_value: i64) -> TrailedInteger {
        let _ = self.stamps.push(self.trail.current_world());
        self.values.push(initial_value)
    }

    pub(crate) fn current_world(&self) -> usize {
        self.trail.current_world()
    }

    #[cfg(test)]
    pub(crate) fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub(crate) fn push_world(&mut self) {
        self.trail.push_world()
    }

    pub(crate) fn pop_world(&mut self) {
        for change in self.trail.pop_world() {
            self.values[change.cell] = change.previous;
            self.stamps[change.cell] = change.previous_stamp;
        }
    }

    /// Merge the current world into its parent, keeping the current values.
    pub(crate) fn commit_world(&mut self) {
        let parent = self.trail.current_world() - 1;
        let stamps = &mut self.stamps;
        self.trail.commit_world(|change| {
            stamps[change.cell] = parent;
            // The parent already holds an entry restoring this cell.
            change.previous_stamp != parent
        });
    }

    pub(crate) fn read(&self, trailed_integer: TrailedInteger) -> i64 {
        self.values[trailed_integer]
    }

    pub(crate) fn assign(&mut self, trailed_integer: TrailedInteger, value: i64) {
        let world = self.trail.current_world();
        let stamp = self.stamps[trailed_integer];
        replan_assert_moderate!(stamp <= world);

        if stamp < world {
            self.trail.record(TrailedChange {
                cell: trailed_integer,
                previous: self.values[trailed_integer],
                previous_stamp: stamp,
            });
            self.stamps[trailed_integer] = world;
        }
        self.values[trailed_integer] = value;
    }

    pub(crate) fn add_assign(&mut self, trailed_integer: TrailedInteger, addition: i64) {
        self.assign(trailed_integer, self.values[trailed_integer] + addition);
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::Rng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_write_resets() {
        let mut values = TrailedValues::default();
        let trailed_integer = values.grow(0);

        assert_eq!(values.read(trailed_integer), 0);

        values.push_world();
        values.add_assign(trailed_integer, 5);
        assert_eq!(values.read(trailed_integer), 5);

        values.add_assign(trailed_integer, 5);
        assert_eq!(values.read(trailed_integer), 10);

        values.push_world();
        values.add_assign(trailed_integer, 1);
        assert_eq!(values.read(trailed_integer), 11);

        values.pop_world();
        assert_eq!(values.read(trailed_integer), 10);

        values.pop_world();
        assert_eq!(values.read(trailed_integer), 0);
    }

    #[test]
    fn a_cell_is_saved_once_per_world() {
        let mut values = TrailedValues::default();
        let cell = values.grow(0);

        values.push_world();
        for i in 1..10 {
            values.assign(cell, i);
        }

        assert_eq!(1, values.trail_len());
    }

    #[test]
    fn root_writes_are_permanent() {
        let mut values = TrailedValues::default();
        let cell = values.grow(0);
        values.assign(cell, 3);

        values.push_world();
        values.assign(cell, 4);
        values.pop_world();

        assert_eq!(3, values.read(cell));
    }

    #[test]
    fn committed_changes_are_undone_with_the_parent() {
        let mut values = TrailedValues::default();
        let a = values.grow(1);
        let b = values.grow(2);

        values.push_world();
        values.assign(a, 10);
        values.push_world();
        values.assign(a, 11);
        values.assign(b, 20);
        values.commit_world();

        assert_eq!(1, values.current_world());
        assert_eq!(11, values.read(a));
        assert_eq!(20, values.read(b));
        // The entry for `a` saved in the committed world is superseded by the parent's entry.
        assert_eq!(2, values.trail_len());

        values.pop_world();
        assert_eq!(1, values.read(a));
        assert_eq!(2, values.read(b));
    }

    #[test]
    fn committing_into_the_root_makes_changes_permanent() {
        let mut values = TrailedValues::default();
        let a = values.grow(1);

        values.push_world();
        values.assign(a, 5);
        values.commit_world();

        assert_eq!(0, values.trail_len());
        values.push_world();
        values.assign(a, 6);
        values.pop_world();
        assert_eq!(5, values.read(a));
    }

    #[test]
    fn committed_cells_are_saved_again_in_the_next_world() {
        let mut values = TrailedValues::default();
        let a = values.grow(0);

        values.push_world();
        values.push_world();
        values.assign(a, 1);
        values.commit_world();
        values.push_world();
        values.assign(a, 2);
        values.pop_world();

        assert_eq!(1, values.read(a));
        values.pop_world();
        assert_eq!(0, values.read(a));
    }

    #[test]
    fn randomised_operations_respect_the_round_trip_law() {
        for seed in 0..50 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut values = TrailedValues::default();
            let cells = (0..8).map(|i| values.grow(i)).collect::<Vec<_>>();

            // Values at the moment each open world was pushed.
            let mut snapshots: Vec<Vec<i64>> = Vec::new();
            let snapshot =
                |values: &TrailedValues| cells.iter().map(|&c| values.read(c)).collect::<Vec<_>>();

            for _ in 0..500 {
                match rng.gen_range(0..10) {
                    0..=1 => {
                        snapshots.push(snapshot(&values));
                        values.push_world();
                    }
                    2 if !snapshots.is_empty() => {
                        values.pop_world();
                        let expected = snapshots.pop().unwrap();
                        assert_eq!(expected, snapshot(&values), "seed {seed}");
                    }
                    3 if !snapshots.is_empty() => {
                        let _ = snapshots.pop();
                        values.commit_world();
                    }
                    _ => {
                        let cell = cells[rng.gen_range(0..cells.len())];
                        values.assign(cell, rng.gen_range(-100..100));
                    }
                }
                assert_eq!(snapshots.len(), values.current_world());
            }

            while let Some(expected) = snapshots.pop() {
                values.pop_world();
                assert_eq!(expected, snapshot(&values), "seed {seed}");
            }
        }
    }
}
