//! Global, opt-in output of statistics as `PREFIX name=value` lines.
//!
//! Nothing is written until [`configure_statistic_logging`] has been called; the scheduler calls
//! [`log_statistic`] unconditionally after every run.

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::io::stdout;
use std::io::Write;
use std::sync::Mutex;
use std::sync::OnceLock;

use convert_case::Case;
use convert_case::Casing;

/// Where and how statistics are written.
pub struct StatisticOptions {
    /// Printed in front of every statistic.
    prefix: &'static str,
    /// Printed once a block of statistics is complete.
    postfix: Option<&'static str>,
    /// Casing applied to statistic names.
    casing: Option<Case>,
    writer: Box<dyn Write + Send>,
}

impl StatisticOptions {
    /// Statistics prefixed with `prefix`, written to stdout with unchanged names.
    pub fn new(prefix: &'static str) -> StatisticOptions {
        StatisticOptions {
            prefix,
            postfix: None,
            casing: None,
            writer: Box::new(stdout()),
        }
    }

    pub fn with_postfix(mut self, postfix: &'static str) -> Self {
        self.postfix = Some(postfix);
        self
    }

    pub fn with_casing(mut self, casing: Case) -> Self {
        self.casing = Some(casing);
        self
    }

    pub fn with_writer(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.writer = writer;
        self
    }

    fn write(&mut self, name: impl Display, value: impl Display) {
        let name = match self.casing {
            Some(casing) => name.to_string().to_case(casing),
            None => name.to_string(),
        };
        let _ = writeln!(self.writer, "{} {name}={value}", self.prefix);
    }
}

impl Debug for StatisticOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticOptions")
            .field("prefix", &self.prefix)
            .field("postfix", &self.postfix)
            .field("casing", &self.casing)
            .field("writer", &"<Writer>")
            .finish()
    }
}

static STATISTIC_OPTIONS: OnceLock<Mutex<StatisticOptions>> = OnceLock::new();

/// Enables statistic logging for the rest of the process. Only the first configuration is kept.
pub fn configure_statistic_logging(options: StatisticOptions) {
    let _ = STATISTIC_OPTIONS.get_or_init(|| Mutex::new(options));
}

/// Logs the statistic `name` with the given `value`, if statistic logging is configured.
pub fn log_statistic(name: impl Display, value: impl Display) {
    if let Some(Ok(mut options)) = STATISTIC_OPTIONS.get().map(Mutex::lock) {
        options.write(name, value);
    }
}

/// Logs the closing line of a block of statistics, if one is configured.
pub fn log_statistic_postfix() {
    if let Some(Ok(mut options)) = STATISTIC_OPTIONS.get().map(Mutex::lock) {
        if let Some(postfix) = options.postfix {
            let _ = writeln!(options.writer, "{postfix}");
        }
    }
}

/// Whether [`configure_statistic_logging`] has been called.
pub fn should_log_statistics() -> bool {
    STATISTIC_OPTIONS.get().is_some()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn names_are_cased_and_prefixed() {
        let buffer = SharedBuffer::default();
        let mut options = StatisticOptions::new("%%")
            .with_casing(Case::Camel)
            .with_writer(Box::new(buffer.clone()));

        options.write("num_decisions", 12);

        let written = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert_eq!("%% numDecisions=12\n", written);
    }
}
