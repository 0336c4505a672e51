//! Operator-facing logging.
//!
//! Callers may inject a callback that receives formatted progress and warning
//! messages. Every message is also emitted as a `tracing` event, so a
//! [`Logger`] without a callback is simply quiet on that channel.

use std::fmt;

#[derive(Clone, Copy, Default)]
pub struct Logger<'a> {
    sink: Option<&'a dyn Fn(&str)>,
}

impl<'a> Logger<'a> {
    pub fn new(sink: &'a dyn Fn(&str)) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn silent() -> Self {
        Self { sink: None }
    }

    pub fn log(&self, message: &str) {
        tracing::info!(target: "d2d", "{message}");
        if let Some(sink) = self.sink {
            sink(message);
        }
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(target: "d2d", "{message}");
        if let Some(sink) = self.sink {
            sink(message);
        }
    }
}

impl fmt::Debug for Logger<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("has_sink", &self.sink.is_some()).finish()
    }
}

/// Periodic progress reporting for long loops.
///
/// Logs whenever completion crosses another `step_percent` boundary, and
/// always at the end.
#[derive(Debug)]
pub struct Progress<'a> {
    logger: Logger<'a>,
    label: String,
    total: usize,
    done: usize,
    step_percent: usize,
    last_reported: usize,
}

impl<'a> Progress<'a> {
    pub fn new(logger: Logger<'a>, label: impl Into<String>, total: usize) -> Self {
        Self {
            logger,
            label: label.into(),
            total,
            done: 0,
            step_percent: 10,
            last_reported: 0,
        }
    }

    pub fn with_step(mut self, step_percent: usize) -> Self {
        self.step_percent = step_percent.clamp(1, 100);
        self
    }

    pub fn advance(&mut self, by: usize) {
        self.done = (self.done + by).min(self.total);
        if self.total == 0 {
            return;
        }
        let percent = self.done * 100 / self.total;
        let bucket = percent / self.step_percent * self.step_percent;
        if bucket > self.last_reported || (self.done == self.total && self.last_reported < 100) {
            self.last_reported = if self.done == self.total { 100 } else { bucket };
            self.logger.log(&format!(
                "{}: {}% ({}/{})",
                self.label, self.last_reported, self.done, self.total
            ));
        }
    }

    pub fn done(&self) -> usize {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn silent_logger_does_nothing() {
        Logger::silent().log("nobody listens");
        Logger::default().warn("still fine");
    }

    #[test]
    fn callback_receives_messages() {
        let lines = RefCell::new(Vec::new());
        let sink = |m: &str| lines.borrow_mut().push(m.to_string());
        let logger = Logger::new(&sink);

        logger.log("first");
        logger.warn("second");
        assert_eq!(*lines.borrow(), vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn progress_reports_on_step_boundaries() {
        let lines = RefCell::new(Vec::new());
        let sink = |m: &str| lines.borrow_mut().push(m.to_string());

        let mut progress = Progress::new(Logger::new(&sink), "Mapping", 10).with_step(50);
        for _ in 0..10 {
            progress.advance(1);
        }

        assert_eq!(
            *lines.borrow(),
            vec!["Mapping: 50% (5/10)".to_string(), "Mapping: 100% (10/10)".to_string()]
        );
        assert_eq!(progress.done(), 10);
    }
}
