use crate::branching::Brancher;
use crate::branching::Decision;
use crate::branching::SelectionContext;
use crate::engine::propagation::ReadDomains;
use crate::engine::variables::DomainId;

/// The start of a VM action, with what is needed to place it in the movement graph.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Movement {
    pub(crate) start: DomainId,
    /// The future host variable, for VMs ending in the running state.
    pub(crate) host: Option<DomainId>,
    /// The index of the current host, for VMs currently on a node.
    pub(crate) source: Option<usize>,
    /// Whether the VM leaves its source whatever its future host.
    pub(crate) departs: bool,
}

/// Schedules the VM actions starting from the leaves of the movement graph.
///
/// The graph has an arc from the source to the destination of every VM which is not yet
/// scheduled. A leaf is a movement whose destination has no pending departure: no VM still has to
/// make room for it, so it can start as early as possible. Movements without a
/// destination are leaves. When only cycles remain, the earliest movement is scheduled first.
#[derive(Debug)]
pub(crate) struct LeafFirstBrancher {
    movements: Vec<Movement>,
    num_nodes: usize,
}

impl LeafFirstBrancher {
    /// The movements are in VM order, which breaks ties after the node order.
    pub(crate) fn new(movements: Vec<Movement>, num_nodes: usize) -> Self {
        LeafFirstBrancher {
            movements,
            num_nodes,
        }
    }

    fn destination(context: &SelectionContext, movement: &Movement) -> Option<usize> {
        movement
            .host
            .and_then(|host| context.fixed_value(host))
            .and_then(|node| usize::try_from(node).ok())
    }

    fn leaves_source(context: &SelectionContext, movement: &Movement) -> bool {
        movement.departs
            || match (Self::destination(context, movement), movement.source) {
                (Some(destination), Some(source)) => destination != source,
                _ => false,
            }
    }
}

impl Brancher for LeafFirstBrancher {
    fn next_decision(&mut self, context: &mut SelectionContext) -> Option<Decision> {
        let unscheduled = self
            .movements
            .iter()
            .enumerate()
            .filter(|(_, movement)| !context.is_fixed(movement.start))
            .collect::<Vec<_>>();
        if unscheduled.is_empty() {
            return None;
        }

        let mut pending_departures = vec![0_usize; self.num_nodes];
        for (_, movement) in &unscheduled {
            if let Some(source) = movement.source {
                if Self::leaves_source(context, movement) && source < self.num_nodes {
                    pending_departures[source] += 1;
                }
            }
        }

        let leaf = unscheduled
            .iter()
            .filter_map(|&(index, movement)| {
                let node = match (movement.host, Self::destination(context, movement)) {
                    (None, _) => movement.source.unwrap_or(usize::MAX),
                    (Some(_), Some(destination)) => {
                        let is_leaf = pending_departures
                            .get(destination)
                            .map_or(true, |&pending| pending == 0);
                        if !is_leaf {
                            return None;
                        }
                        destination
                    }
                    (Some(_), None) => return None,
                };
                Some(((node, index), movement))
            })
            .min_by_key(|&(key, _)| key)
            .map(|(_, movement)| movement);

        let movement = leaf.or_else(|| {
            let earliest = |moving: bool| {
                unscheduled
                    .iter()
                    .filter(|(_, movement)| Self::leaves_source(context, movement) == moving)
                    .min_by_key(|(_, movement)| context.lower_bound(movement.start))
                    .map(|&(_, movement)| movement)
            };
            earliest(true).or_else(|| earliest(false))
        })?;

        Some(Decision::new(
            movement.start,
            context.lower_bound(movement.start),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::TestRandom;
    use crate::engine::ConstraintSolver;

    fn migration(solver: &mut ConstraintSolver, source: usize, destination: i32) -> Movement {
        Movement {
            start: solver.new_bounded_integer(0, 10),
            host: Some(solver.new_constant(destination)),
            source: Some(source),
            departs: false,
        }
    }

    #[test]
    fn migrations_to_nodes_without_departures_come_first() {
        let mut solver = ConstraintSolver::default();
        // 0 -> 1 waits for 1 -> 2, which is a leaf.
        let first = migration(&mut solver, 0, 1);
        let second = migration(&mut solver, 1, 2);
        let mut brancher = LeafFirstBrancher::new(vec![first, second], 3);

        let mut random = TestRandom::default();
        let mut context = SelectionContext::new(solver.domains(), &mut random);
        assert_eq!(Some(Decision::new(second.start, 0)), brancher.next_decision(&mut context));
    }

    #[test]
    fn departures_without_destination_are_leaves() {
        let mut solver = ConstraintSolver::default();
        let migration = migration(&mut solver, 0, 1);
        let shutdown = Movement {
            start: solver.new_bounded_integer(2, 10),
            host: None,
            source: Some(1),
            departs: true,
        };
        let mut brancher = LeafFirstBrancher::new(vec![migration, shutdown], 2);

        let mut random = TestRandom::default();
        let mut context = SelectionContext::new(solver.domains(), &mut random);
        assert_eq!(Some(Decision::new(shutdown.start, 2)), brancher.next_decision(&mut context));
    }

    #[test]
    fn cycles_are_broken_at_the_earliest_movement() {
        let mut solver = ConstraintSolver::default();
        let swap = |solver: &mut ConstraintSolver, source: usize, destination, earliest| Movement {
            start: solver.new_bounded_integer(earliest, 10),
            host: Some(solver.new_constant(destination)),
            source: Some(source),
            departs: false,
        };
        let first = swap(&mut solver, 0, 1, 4);
        let second = swap(&mut solver, 1, 0, 1);
        let mut brancher = LeafFirstBrancher::new(vec![first, second], 2);

        let mut random = TestRandom::default();
        let mut context = SelectionContext::new(solver.domains(), &mut random);
        assert_eq!(Some(Decision::new(second.start, 1)), brancher.next_decision(&mut context));
    }
}
