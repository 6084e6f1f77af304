use std::fmt::Display;

use super::statistic_logging::log_statistic;

/// Responsible for logging the statistics with the provided prefix; used to distinguish the
/// statistics of the partitions of an instance.
#[derive(Debug, Default, Clone)]
pub struct StatisticLogger {
    /// The prefix which will be attached to the statistic name
    name_prefix: String,
}

impl StatisticLogger {
    pub fn new(name_prefix: impl Display) -> Self {
        Self {
            name_prefix: name_prefix.to_string(),
        }
    }

    pub fn attach_to_prefix(&self, addition_to_prefix: impl Display) -> Self {
        let name_prefix = if self.name_prefix.is_empty() {
            addition_to_prefix.to_string()
        } else {
            format!("{}_{}", self.name_prefix, addition_to_prefix)
        };
        Self { name_prefix }
    }
}

impl std::fmt::Write for StatisticLogger {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        log_statistic(&self.name_prefix, s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_are_joined_with_underscores() {
        let logger = StatisticLogger::new("partition0").attach_to_prefix("numDecisions");

        assert_eq!("partition0_numDecisions", logger.name_prefix);
    }

    #[test]
    fn an_empty_prefix_is_not_joined() {
        let logger = StatisticLogger::default().attach_to_prefix("solutions");

        assert_eq!("solutions", logger.name_prefix);
    }
}
