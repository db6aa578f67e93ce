//! Status reporting for long-running operations.
//!
//! Components receive a `&dyn Reporter` instead of writing to a global
//! logger, so pipelines can run silently under test and callers decide
//! where operator-facing output goes.

/// Prefixed status output consumed by the build and deploy pipelines.
pub trait Reporter {
    fn info(&self, prefix: &str, message: &str);
    fn warn(&self, prefix: &str, message: &str);
    fn error(&self, prefix: &str, message: &str);
    fn debug(&self, prefix: &str, message: &str);
}

/// Production reporter writing `[prefix] message` lines to stderr.
pub struct StderrReporter {
    verbose: bool,
}

impl StderrReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for StderrReporter {
    fn info(&self, prefix: &str, message: &str) {
        eprintln!("[{}] {}", prefix, message);
    }

    fn warn(&self, prefix: &str, message: &str) {
        eprintln!("[{}] warning: {}", prefix, message);
    }

    fn error(&self, prefix: &str, message: &str) {
        eprintln!("[{}] error: {}", prefix, message);
    }

    fn debug(&self, prefix: &str, message: &str) {
        if self.verbose {
            eprintln!("[{}] {}", prefix, message);
        }
    }
}

#[cfg(test)]
pub(crate) struct RecordingReporter {
    events: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub(crate) fn new() -> Self {
        Self {
            events: std::cell::RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn contains(&self, fragment: &str) -> bool {
        self.events.borrow().iter().any(|e| e.contains(fragment))
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn info(&self, prefix: &str, message: &str) {
        self.events
            .borrow_mut()
            .push(format!("info [{}] {}", prefix, message));
    }

    fn warn(&self, prefix: &str, message: &str) {
        self.events
            .borrow_mut()
            .push(format!("warn [{}] {}", prefix, message));
    }

    fn error(&self, prefix: &str, message: &str) {
        self.events
            .borrow_mut()
            .push(format!("error [{}] {}", prefix, message));
    }

    fn debug(&self, prefix: &str, message: &str) {
        self.events
            .borrow_mut()
            .push(format!("debug [{}] {}", prefix, message));
    }
}
