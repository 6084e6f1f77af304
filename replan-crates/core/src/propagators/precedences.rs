//! Conditional precedences: the start of a task must come after the ends of the tasks that
//! share the resource the first task ends up on.
use crate::basic_types::PropagationStatus;
use crate::containers::HashMap;
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

/// The [`PropagatorConstructor`] for the [`PrecedencesPropagator`].
#[derive(Clone, Debug)]
pub(crate) struct PrecedencesPropagatorArgs {
    pub(crate) host: DomainId,
    pub(crate) start: DomainId,
    /// Pairs `(h, end)`: if `host == h` then `end <= start`.
    pub(crate) others: Box<[(i32, DomainId)]>,
}

impl PropagatorConstructor for PrecedencesPropagatorArgs {
    type PropagatorImpl = PrecedencesPropagator;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let PrecedencesPropagatorArgs {
            host,
            start,
            others,
        } = self;

        let mut ends_by_host: HashMap<i32, Vec<DomainId>> = HashMap::default();
        for &(value, end) in others.iter() {
            ends_by_host.entry(value).or_default().push(end);
            context.register(end, DomainEvents::LOWER_BOUND);
        }
        context.register(host, DomainEvents::ANY_INT);
        context.register(start, DomainEvents::UPPER_BOUND);

        PrecedencesPropagator {
            host,
            start,
            ends_by_host: ends_by_host
                .into_iter()
                .map(|(value, ends)| (value, ends.into_boxed_slice()))
                .collect(),
        }
    }
}

/// Propagator for `\forall (h, end) in others: host == h -> end <= start`.
#[derive(Clone, Debug)]
pub(crate) struct PrecedencesPropagator {
    host: DomainId,
    start: DomainId,
    ends_by_host: HashMap<i32, Box<[DomainId]>>,
}

impl PrecedencesPropagator {
    /// The earliest moment the tasks ending on `value` are all over; `i32::MIN` if there are none.
    fn horizon<Context: ReadDomains>(&self, context: &Context, value: i32) -> i32 {
        self.ends_by_host
            .get(&value)
            .and_then(|ends| ends.iter().map(|&end| context.lower_bound(end)).max())
            .unwrap_or(i32::MIN)
    }
}

impl Propagator for PrecedencesPropagator {
    fn name(&self) -> &str {
        "Precedences"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn propagate(&mut self, mut context: PropagationContextMut) -> PropagationStatus {
        loop {
            if let Some(value) = context.fixed_value(self.host) {
                let horizon = self.horizon(&context, value);
                let _ = context.set_lower_bound(self.start, horizon)?;

                let latest_start = context.upper_bound(self.start);
                if let Some(ends) = self.ends_by_host.get(&value) {
                    for &end in ends.iter() {
                        let _ = context.set_upper_bound(end, latest_start)?;
                    }
                }
                return Ok(());
            }

            let latest_start = context.upper_bound(self.start);
            let candidates = context.iterate_domain(self.host).collect::<Vec<_>>();
            let mut host_changed = false;
            for value in candidates {
                if self.horizon(&context, value) > latest_start {
                    host_changed |= context.remove(self.host, value)?;
                }
            }

            let earliest_start = context
                .iterate_domain(self.host)
                .map(|value| self.horizon(&context, value))
                .min()
                .unwrap_or(i32::MIN);
            let _ = context.set_lower_bound(self.start, earliest_start)?;

            if !host_changed {
                return Ok(());
            }
        }
    }

    fn is_entailed(&self, context: PropagationContext) -> Entailment {
        let Some(value) = context.fixed_value(self.host) else {
            return Entailment::Undefined;
        };

        let earliest_start = context.lower_bound(self.start);
        let all_before = self.ends_by_host.get(&value).map_or(true, |ends| {
            ends.iter()
                .all(|&end| context.upper_bound(end) <= earliest_start)
        });

        if all_before {
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

    #[test]
    fn fixed_host_delays_the_start() {
        let mut solver = TestSolver::default();
        let host = solver.new_sparse_variable(&[0, 1]);
        let start = solver.new_variable(0, 20);
        let end_a = solver.new_variable(4, 10);
        let end_b = solver.new_variable(7, 10);
        solver.assign(host, 0).expect("non-empty domain");

        let _ = solver
            .new_propagator(PrecedencesPropagatorArgs {
                host,
                start,
                others: [(0, end_a), (1, end_b)].into(),
            })
            .expect("no empty domains");

        solver.assert_bounds(start, 4, 20);
        solver.assert_bounds(end_b, 7, 10);
    }

    #[test]
    fn fixed_host_bounds_the_ends_from_above() {
        let mut solver = TestSolver::default();
        let host = solver.new_sparse_variable(&[2]);
        let start = solver.new_variable(0, 6);
        let end = solver.new_variable(3, 10);

        let _ = solver
            .new_propagator(PrecedencesPropagatorArgs {
                host,
                start,
                others: [(2, end)].into(),
            })
            .expect("no empty domains");

        solver.assert_bounds(end, 3, 6);
        solver.assert_bounds(start, 3, 6);
    }

    #[test]
    fn late_hosts_are_removed() {
        let mut solver = TestSolver::default();
        let host = solver.new_sparse_variable(&[0, 1, 2]);
        let start = solver.new_variable(0, 5);
        let end_0 = solver.new_variable(8, 10);
        let end_1 = solver.new_variable(2, 10);

        let _ = solver
            .new_propagator(PrecedencesPropagatorArgs {
                host,
                start,
                others: [(0, end_0), (1, end_1)].into(),
            })
            .expect("no empty domains");

        assert!(!solver.contains(host, 0));
        assert!(solver.contains(host, 1));
        assert!(solver.contains(host, 2));
        // Host 2 has no precedences, so nothing is known about the start.
        solver.assert_bounds(start, 0, 5);
    }

    #[test]
    fn start_is_bounded_by_the_earliest_host() {
        let mut solver = TestSolver::default();
        let host = solver.new_sparse_variable(&[0, 1]);
        let start = solver.new_variable(0, 20);
        let end_0 = solver.new_variable(8, 10);
        let end_1 = solver.new_variable(3, 10);

        let _ = solver
            .new_propagator(PrecedencesPropagatorArgs {
                host,
                start,
                others: [(0, end_0), (1, end_1)].into(),
            })
            .expect("no empty domains");

        solver.assert_bounds(start, 3, 20);

        solver.set_upper_bound(start, 7).expect("non-empty domain");
        solver.propagate_until_fixed_point().expect("non-empty domain");

        assert!(!solver.contains(host, 0));
        solver.assert_bounds(end_1, 3, 7);
    }

    #[test]
    fn no_viable_host_is_a_contradiction() {
        let mut solver = TestSolver::default();
        let host = solver.new_sparse_variable(&[0, 1]);
        let start = solver.new_variable(0, 3);
        let end_0 = solver.new_variable(5, 10);
        let end_1 = solver.new_variable(4, 10);

        let result = solver.new_propagator(PrecedencesPropagatorArgs {
            host,
            start,
            others: [(0, end_0), (1, end_1)].into(),
        });

        assert!(result.is_err());
    }

    #[test]
    fn propagation_is_idempotent() {
        let mut solver = TestSolver::default();
        let host = solver.new_sparse_variable(&[0, 1, 2]);
        let start = solver.new_variable(0, 9);
        let end_0 = solver.new_variable(10, 12);
        let end_1 = solver.new_variable(2, 10);
        let end_2 = solver.new_variable(5, 10);

        let propagator = solver
            .new_propagator(PrecedencesPropagatorArgs {
                host,
                start,
                others: [(0, end_0), (1, end_1), (2, end_2)].into(),
            })
            .expect("no empty domains");

        assert_eq!(Ok(false), solver.propagate_once(propagator));
        solver.assert_bounds(start, 2, 9);
    }
}
