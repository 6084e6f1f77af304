//! Resource-aware scheduling of the VMs leaving and arriving on one node.
//!
//! Every VM running on the node at the beginning of the reconfiguration holds a consuming slice,
//! active from time `0` until the end of its action. Every VM that may run on the node afterwards
//! holds a demanding slice, active from the start of its action onwards when it is placed on the
//! node. Whenever a demanding slice starts and increases the load of the node, the load must fit
//! the capacity of the node on every dimension. A VM staying on the node has both slices; the
//! consuming one ends when the demanding one starts.
use crate::basic_types::PropagationStatus;
use crate::engine::domain_events::DomainEvents;
use crate::engine::propagation::Entailment;
use crate::engine::propagation::PropagationContext;
use crate::engine::propagation::PropagationContextMut;
use crate::engine::propagation::Propagator;
use crate::engine::propagation::PropagatorConstructor;
use crate::engine::propagation::PropagatorConstructorContext;
use crate::engine::propagation::Priority;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::DomainId;
use crate::engine::EmptyDomain;
use crate::replan_assert_simple;

/// A slice active from time `0` until `end`.
#[derive(Clone, Debug)]
pub(crate) struct ConsumingSlice {
    pub(crate) end: DomainId,
    pub(crate) usages: Box<[i32]>,
}

/// A slice active from `start` onwards, when `host` is the node.
#[derive(Clone, Debug)]
pub(crate) struct DemandingSlice {
    pub(crate) host: DomainId,
    pub(crate) start: DomainId,
    pub(crate) usages: Box<[i32]>,
    /// The consuming slice of the same VM, if the VM currently runs on the node.
    pub(crate) resident: Option<usize>,
}

/// The [`PropagatorConstructor`] for the [`TaskSchedulerPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct TaskSchedulerPropagatorArgs {
    /// The value of the host variables designating the node.
    pub(crate) node: i32,
    pub(crate) capacities: Box<[i32]>,
    pub(crate) consuming: Box<[ConsumingSlice]>,
    pub(crate) demanding: Box<[DemandingSlice]>,
}

impl PropagatorConstructor for TaskSchedulerPropagatorArgs {
    type PropagatorImpl = TaskSchedulerPropagator;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let TaskSchedulerPropagatorArgs {
            node,
            capacities,
            consuming,
            demanding,
        } = self;
        replan_assert_simple!(consuming
            .iter()
            .all(|slice| slice.usages.len() == capacities.len()));
        replan_assert_simple!(demanding
            .iter()
            .all(|slice| slice.usages.len() == capacities.len()));

        for slice in consuming.iter() {
            context.register(slice.end, DomainEvents::LOWER_BOUND);
        }
        for slice in demanding.iter() {
            context.register(slice.host, DomainEvents::ANY_INT);
            context.register(slice.start, DomainEvents::BOUNDS);
        }

        TaskSchedulerPropagator {
            node,
            capacities,
            consuming,
            demanding,
            deltas: Vec::new(),
            profile: Vec::new(),
        }
    }
}

/// Time-table propagator over the slices of one node.
///
/// The profile of a dimension sums the compulsory parts of the slices: a consuming slice
/// certainly runs before the lower bound of its end, and a demanding slice placed on the node
/// certainly runs after the upper bound of its start. A demanding slice can only start at a
/// moment where the profile of the other slices leaves room for it.
#[derive(Clone, Debug)]
pub(crate) struct TaskSchedulerPropagator {
    node: i32,
    capacities: Box<[i32]>,
    consuming: Box<[ConsumingSlice]>,
    demanding: Box<[DemandingSlice]>,
    deltas: Vec<(i32, i64)>,
    /// Pairs `(t, load)`: the compulsory load from `t` until the next moment, sorted by time.
    profile: Vec<(i32, i64)>,
}

impl TaskSchedulerPropagator {
    /// Whether the start of `slice` raises the load on `dimension`.
    fn increases(&self, slice: &DemandingSlice, dimension: usize) -> bool {
        let before = slice
            .resident
            .map_or(0, |resident| self.consuming[resident].usages[dimension]);
        slice.usages[dimension] > before
    }

    fn compute_profile<Context: ReadDomains>(&mut self, context: &Context, dimension: usize) {
        self.deltas.clear();
        let mut level = 0_i64;
        for slice in self.consuming.iter() {
            let usage = slice.usages[dimension] as i64;
            level += usage;
            self.deltas.push((context.lower_bound(slice.end), -usage));
        }
        for slice in self.demanding.iter() {
            if context.fixed_value(slice.host) == Some(self.node) {
                let usage = slice.usages[dimension] as i64;
                self.deltas.push((context.upper_bound(slice.start), usage));
            }
        }
        self.deltas.sort_unstable_by_key(|&(time, _)| time);

        self.profile.clear();
        self.profile.push((i32::MIN, level));
        for &(time, delta) in self.deltas.iter() {
            level += delta;
            if self.profile.last().is_some_and(|&(last, _)| last == time) {
                if let Some(last) = self.profile.last_mut() {
                    last.1 = level;
                }
            } else {
                self.profile.push((time, level));
            }
        }
    }

    /// The earliest start of the demanding slice `index` on the node where the load fits the
    /// capacity of `dimension`, according to the current profile.
    fn earliest_fit<Context: ReadDomains>(
        &self,
        context: &Context,
        dimension: usize,
        index: usize,
    ) -> Option<i32> {
        let slice = &self.demanding[index];
        let usage = slice.usages[dimension] as i64;
        let capacity = self.capacities[dimension] as i64;

        // The profile already counts the compulsory part of the slice itself, and the consuming
        // slice of a VM staying on the node is over once its demanding slice starts.
        let own_from = (context.fixed_value(slice.host) == Some(self.node))
            .then(|| context.upper_bound(slice.start));
        let resident = slice.resident.map(|resident| {
            let resident = &self.consuming[resident];
            (context.lower_bound(resident.end), resident.usages[dimension] as i64)
        });
        let fits = |time: i32, level: i64| {
            let mut load = level + usage;
            if own_from.is_some_and(|from| from <= time) {
                load -= usage;
            }
            if let Some((until, resident_usage)) = resident {
                if time < until {
                    load -= resident_usage;
                }
            }
            load <= capacity
        };

        let earliest = context.lower_bound(slice.start);
        let latest = context.upper_bound(slice.start);
        let first = self.profile.partition_point(|&(time, _)| time <= earliest);
        std::iter::once((earliest, self.profile[first - 1].1))
            .chain(
                self.profile[first..]
                    .iter()
                    .copied()
                    .take_while(|&(time, _)| time <= latest),
            )
            .find(|&(time, level)| fits(time, level))
            .map(|(time, _)| time)
    }

    /// Apply the time-table rules on one dimension; returns whether a domain changed.
    fn filter_dimension(
        &mut self,
        context: &mut PropagationContextMut,
        dimension: usize,
    ) -> Result<bool, EmptyDomain> {
        self.compute_profile(&*context, dimension);

        let mut changed = false;
        for index in 0..self.demanding.len() {
            let slice = &self.demanding[index];
            if !context.contains(slice.host, self.node) || !self.increases(slice, dimension) {
                continue;
            }
            let (host, start) = (slice.host, slice.start);
            match self.earliest_fit(&*context, dimension, index) {
                Some(time) if context.is_fixed(host) => {
                    changed |= context.set_lower_bound(start, time)?;
                }
                Some(_) => {}
                None => changed |= context.remove(host, self.node)?,
            }
        }
        Ok(changed)
    }
}

impl Propagator for TaskSchedulerPropagator {
    fn name(&self) -> &str {
        "TaskScheduler"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&mut self, mut context: PropagationContextMut) -> PropagationStatus {
        loop {
            let mut changed = false;
            for dimension in 0..self.capacities.len() {
                changed |= self.filter_dimension(&mut context, dimension)?;
            }
            if !changed {
                return Ok(());
            }
        }
    }

    /// Once every slice is fixed the profile is exact, and the last propagation checked it.
    fn is_entailed(&self, context: PropagationContext) -> Entailment {
        let consuming_fixed = self
            .consuming
            .iter()
            .all(|slice| context.is_fixed(slice.end));
        let demanding_fixed = self.demanding.iter().all(|slice| {
            context.fixed_value(slice.host).is_some_and(|host| {
                host != self.node || context.is_fixed(slice.start)
            })
        });

        if consuming_fixed && demanding_fixed {
            Entailment::True
        } else {
            Entailment::Undefined
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::TestSolver;

    fn consuming(end: DomainId, usage: i32) -> ConsumingSlice {
        ConsumingSlice {
            end,
            usages: [usage].into(),
        }
    }

    fn demanding(host: DomainId, start: DomainId, usage: i32) -> DemandingSlice {
        DemandingSlice {
            host,
            start,
            usages: [usage].into(),
            resident: None,
        }
    }

    fn node_zero(
        capacity: i32,
        consuming: Vec<ConsumingSlice>,
        demanding: Vec<DemandingSlice>,
    ) -> TaskSchedulerPropagatorArgs {
        TaskSchedulerPropagatorArgs {
            node: 0,
            capacities: [capacity].into(),
            consuming: consuming.into(),
            demanding: demanding.into(),
        }
    }

    #[test]
    fn arrivals_overlap_departures_when_the_node_has_room() {
        let mut solver = TestSolver::default();
        let leaving_end = solver.new_variable(2, 10);
        let host = solver.new_sparse_variable(&[0]);
        let start = solver.new_variable(0, 10);

        let _ = solver
            .new_propagator(node_zero(
                4,
                vec![consuming(leaving_end, 1)],
                vec![demanding(host, start, 1)],
            ))
            .expect("no empty domains");

        solver.assert_bounds(start, 0, 10);
    }

    #[test]
    fn arrival_waits_for_the_departure_on_a_full_node() {
        let mut solver = TestSolver::default();
        let leaving_end = solver.new_variable(3, 10);
        let host = solver.new_sparse_variable(&[0]);
        let start = solver.new_variable(0, 10);

        let _ = solver
            .new_propagator(node_zero(
                2,
                vec![consuming(leaving_end, 2)],
                vec![demanding(host, start, 1)],
            ))
            .expect("no empty domains");

        solver.assert_bounds(start, 3, 10);
    }

    #[test]
    fn nodes_without_room_in_time_are_removed_from_the_host() {
        let mut solver = TestSolver::default();
        let leaving_end = solver.new_variable(6, 10);
        let host = solver.new_sparse_variable(&[0, 1]);
        let start = solver.new_variable(0, 4);

        let _ = solver
            .new_propagator(node_zero(
                1,
                vec![consuming(leaving_end, 1)],
                vec![demanding(host, start, 1)],
            ))
            .expect("no empty domains");

        assert!(!solver.contains(host, 0));
        assert!(solver.contains(host, 1));
        // The start only depends on the node once the VM is placed on it.
        solver.assert_bounds(start, 0, 4);
    }

    #[test]
    fn growing_in_place_waits_for_room() {
        let mut solver = TestSolver::default();
        let resident_end = solver.new_variable(0, 10);
        let other_end = solver.new_variable(4, 10);
        let host = solver.new_sparse_variable(&[0]);
        let start = solver.new_variable(0, 10);

        let mut growing = demanding(host, start, 3);
        growing.resident = Some(0);
        let _ = solver
            .new_propagator(node_zero(
                4,
                vec![consuming(resident_end, 2), consuming(other_end, 2)],
                vec![growing],
            ))
            .expect("no empty domains");

        solver.assert_bounds(start, 4, 10);
    }

    #[test]
    fn an_overloaded_node_is_fine_while_nothing_grows_on_it() {
        let mut solver = TestSolver::default();
        let resident_end = solver.new_variable(0, 10);
        let other_end = solver.new_variable(5, 10);
        let host = solver.new_sparse_variable(&[0]);
        let start = solver.new_variable(0, 10);

        let mut shrinking = demanding(host, start, 1);
        shrinking.resident = Some(0);
        let _ = solver
            .new_propagator(node_zero(
                2,
                vec![consuming(resident_end, 2), consuming(other_end, 3)],
                vec![shrinking],
            ))
            .expect("no empty domains");

        solver.assert_bounds(start, 0, 10);
    }

    #[test]
    fn an_overlap_beyond_the_capacity_is_a_contradiction() {
        let mut solver = TestSolver::default();
        let leaving_end = solver.new_variable(5, 5);
        let host = solver.new_sparse_variable(&[0]);
        let start = solver.new_variable(2, 2);

        let result = solver.new_propagator(node_zero(
            1,
            vec![consuming(leaving_end, 1)],
            vec![demanding(host, start, 1)],
        ));

        assert!(result.is_err());
    }

    #[test]
    fn placing_a_vm_delays_the_later_arrivals() {
        let mut solver = TestSolver::default();
        let first_host = solver.new_sparse_variable(&[0, 1]);
        let first_start = solver.new_variable(0, 10);
        let second_host = solver.new_sparse_variable(&[0]);
        let second_start = solver.new_variable(0, 10);
        let leaving_end = solver.new_variable(6, 10);

        let _ = solver
            .new_propagator(node_zero(
                2,
                vec![consuming(leaving_end, 1)],
                vec![
                    demanding(first_host, first_start, 1),
                    demanding(second_host, second_start, 1),
                ],
            ))
            .expect("no empty domains");
        solver.assert_bounds(second_start, 0, 10);

        solver.assign(first_host, 0).expect("non-empty domain");
        solver.set_upper_bound(first_start, 1).expect("non-empty domain");
        solver.propagate_until_fixed_point().expect("non-empty domain");

        // From time 1 on, the first arrival and the departing VM fill the node.
        solver.assert_bounds(second_start, 0, 10);
        solver.set_lower_bound(second_start, 1).expect("non-empty domain");
        solver.propagate_until_fixed_point().expect("non-empty domain");
        solver.assert_bounds(second_start, 6, 10);
    }

    #[test]
    fn propagation_is_idempotent() {
        let mut solver = TestSolver::default();
        let leaving_end = solver.new_variable(3, 10);
        let host = solver.new_sparse_variable(&[0, 1]);
        let start = solver.new_variable(0, 10);
        solver.assign(host, 0).expect("non-empty domain");

        let propagator = solver
            .new_propagator(node_zero(
                1,
                vec![consuming(leaving_end, 1)],
                vec![demanding(host, start, 1)],
            ))
            .expect("no empty domains");

        assert_eq!(Ok(false), solver.propagate_once(propagator));
        solver.assert_bounds(start, 3, 10);
    }
}
