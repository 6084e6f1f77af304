use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::TerminationCondition;

/// A [`TerminationCondition`] shared between concurrent searches; raising it from any clone stops
/// all of them.
#[derive(Clone, Debug, Default)]
pub struct StopFlag {
    raised: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> StopFlag {
        StopFlag::default()
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::Relaxed)
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Relaxed)
    }
}

impl TerminationCondition for StopFlag {
    fn should_stop(&mut self) -> bool {
        self.is_raised()
    }
}
