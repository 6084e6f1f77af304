use log::debug;
use log::trace;

use crate::basic_types::Random;
use crate::basic_types::Solution;
use crate::branching::Brancher;
use crate::branching::Decision;
use crate::branching::SelectionContext;
use crate::create_statistics_struct;
use crate::engine::variables::DomainId;
use crate::engine::ConstraintSolver;
use crate::termination::TerminationCondition;

create_statistics_struct!(
    /// The statistics of a single search.
    pub(crate) SearchStatistics {
        num_decisions: u64,
        num_backtracks: u64,
        num_solutions: u64,
        num_propagations: u64,
        peak_depth: u64,
    }
);

/// How a search ended.
#[derive(Debug)]
pub(crate) enum SearchOutcome {
    /// The best solution, proven optimal; or the first one when there is no objective.
    Optimal(Solution),
    /// A solution was found, but the search stopped before proving it optimal.
    Satisfiable(Solution),
    /// The search space has no solution.
    Infeasible,
    /// The search stopped before finding any solution.
    Unknown,
}

/// Explores the search space depth first, guided by a [`Brancher`].
#[derive(Debug)]
pub(crate) struct DepthFirstSearch<B> {
    brancher: B,
    decisions: Vec<Decision>,
    statistics: SearchStatistics,
}

impl<B: Brancher> DepthFirstSearch<B> {
    pub(crate) fn new(brancher: B) -> Self {
        DepthFirstSearch {
            brancher,
            decisions: Vec::new(),
            statistics: SearchStatistics::default(),
        }
    }

    pub(crate) fn statistics(&self) -> SearchStatistics {
        self.statistics
    }

    /// Search for a solution of `solver`, minimising `objective` if given.
    ///
    /// `on_solution` is called with every solution found and its objective value. The solver is
    /// left in an arbitrary world.
    pub(crate) fn solve(
        &mut self,
        solver: &mut ConstraintSolver,
        objective: Option<DomainId>,
        termination: &mut impl TerminationCondition,
        random: &mut dyn Random,
        mut on_solution: impl FnMut(&Solution, Option<i32>),
    ) -> SearchOutcome {
        let outcome = self.explore(solver, objective, termination, random, &mut on_solution);
        self.statistics.num_propagations = solver.num_propagations();
        outcome
    }

    fn explore(
        &mut self,
        solver: &mut ConstraintSolver,
        objective: Option<DomainId>,
        termination: &mut impl TerminationCondition,
        random: &mut dyn Random,
        on_solution: &mut impl FnMut(&Solution, Option<i32>),
    ) -> SearchOutcome {
        if solver.propagate().is_err() {
            debug!("the root propagation failed");
            return SearchOutcome::Infeasible;
        }

        let mut best: Option<(Solution, Option<i32>)> = None;
        loop {
            if termination.should_stop() {
                debug!("the search was stopped after {} decisions", self.statistics.num_decisions);
                return match best {
                    Some((solution, _)) => SearchOutcome::Satisfiable(solution),
                    None => SearchOutcome::Unknown,
                };
            }

            let decision = {
                let mut context = SelectionContext::new(solver.domains(), random);
                self.brancher.next_decision(&mut context)
            };

            match decision {
                Some(decision) => {
                    trace!("deciding {} = {}", decision.var, decision.value);
                    self.statistics.num_decisions += 1;
                    termination.decision_has_been_made();
                    solver.push_world();
                    self.decisions.push(decision);
                    self.statistics.peak_depth =
                        self.statistics.peak_depth.max(self.decisions.len() as u64);
                    if solver.decide(decision.var, decision.value).is_ok() {
                        continue;
                    }
                }
                None => {
                    let solution = solver.solution();
                    let value = objective.map(|objective| solution.value(objective));
                    self.statistics.num_solutions += 1;
                    debug!("solution #{} with objective {value:?}", self.statistics.num_solutions);
                    on_solution(&solution, value);
                    self.brancher.on_solution();
                    if value.is_none() {
                        return SearchOutcome::Optimal(solution);
                    }
                    best = Some((solution, value));
                }
            }

            let bound = objective.zip(best.as_ref().and_then(|(_, value)| value.map(|v| v - 1)));
            if !self.backtrack(solver, bound) {
                return match best {
                    Some((solution, _)) => SearchOutcome::Optimal(solution),
                    None => SearchOutcome::Infeasible,
                };
            }
        }
    }

    /// Undo decisions until the opposite of one of them holds, together with `bound` on the
    /// objective. Returns `false` once the search space is exhausted.
    fn backtrack(
        &mut self,
        solver: &mut ConstraintSolver,
        bound: Option<(DomainId, i32)>,
    ) -> bool {
        self.brancher.on_backtrack();
        while let Some(decision) = self.decisions.pop() {
            self.statistics.num_backtracks += 1;
            solver.pop_world();

            solver.push_world();
            let status = solver.refute(decision.var, decision.value).and_then(|_| {
                match bound {
                    Some((objective, bound)) => solver.enforce_upper_bound(objective, bound),
                    None => Ok(()),
                }
            });
            if status.is_ok() {
                solver.commit_world();
                return true;
            }
            solver.pop_world();
        }
        false
    }
}
