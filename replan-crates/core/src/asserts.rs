//! Internal consistency checks, graded by cost.
//!
//! Simple checks always run. Moderate checks only run in tests or with the `debug-checks`
//! feature, since they sit on the hot path of propagation.

pub const REPLAN_ASSERT_SIMPLE: u8 = 1;
pub const REPLAN_ASSERT_MODERATE: u8 = 2;

#[cfg(not(any(test, feature = "debug-checks")))]
pub const REPLAN_ASSERT_LEVEL: u8 = REPLAN_ASSERT_SIMPLE;
#[cfg(any(test, feature = "debug-checks"))]
pub const REPLAN_ASSERT_LEVEL: u8 = REPLAN_ASSERT_MODERATE;

#[macro_export]
#[doc(hidden)]
macro_rules! replan_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::REPLAN_ASSERT_LEVEL >= $crate::asserts::REPLAN_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! replan_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::REPLAN_ASSERT_LEVEL >= $crate::asserts::REPLAN_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}
