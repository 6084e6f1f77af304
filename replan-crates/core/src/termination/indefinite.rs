use super::TerminationCondition;

/// Lets the search run until it proves optimality or infeasibility.
#[derive(Clone, Copy, Debug, Default)]
pub struct Indefinite;

impl TerminationCondition for Indefinite {
    fn should_stop(&mut self) -> bool {
        false
    }
}
