//! Counters gathered while scheduling, and their optional output as `PREFIX name=value` lines.
pub(crate) mod statistic_logger;
pub(crate) mod statistic_logging;

use std::fmt::Display;
use std::fmt::Write;

pub use statistic_logger::StatisticLogger;
pub use statistic_logging::configure_statistic_logging;
pub use statistic_logging::log_statistic;
pub use statistic_logging::log_statistic_postfix;
pub use statistic_logging::should_log_statistics;
pub use statistic_logging::StatisticOptions;

/// Something that can be written out as one or more named statistics.
pub trait Statistic {
    fn log(&self, statistic_logger: StatisticLogger);
}

impl<Value: Display> Statistic for Value {
    fn log(&self, mut statistic_logger: StatisticLogger) {
        // StatisticLogger::write_str is infallible.
        let _ = write!(statistic_logger, "{self}");
    }
}

/// Declares a plain struct of counters which logs every field under its own name.
///
/// ```rust
/// # use replan_core::create_statistics_struct;
/// create_statistics_struct!(pub SearchCounters {
///     backtracks: u64,
///     solutions: u64,
/// });
///
/// let counters = SearchCounters::default();
/// assert_eq!(0, counters.backtracks + counters.solutions);
/// ```
#[macro_export]
macro_rules! create_statistics_struct {
    (
        $(#[$struct_doc:meta])*
        $vis:vis $name:ident {
            $($(#[$field_doc:meta])* $field:ident : $type:ident),+ $(,)?
        }
    ) => {
        $(#[$struct_doc])*
        #[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
        $vis struct $name {
            $($(#[$field_doc])* $vis $field: $type),+
        }

        impl $crate::statistics::Statistic for $name {
            fn log(&self, statistic_logger: $crate::statistics::StatisticLogger) {
                $(
                    $crate::statistics::Statistic::log(
                        &self.$field,
                        statistic_logger.attach_to_prefix(stringify!($field)),
                    );
                )+
            }
        }
    };
}
