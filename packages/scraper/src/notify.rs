//! End-of-run notification.

use std::cell::RefCell;

use crate::error::Result;

/// Receives the run summary once the crawl is over.
pub trait Notifier {
    fn notify(&self, subject: &str, body: &str) -> Result<()>;
}

/// Writes the summary to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, subject: &str, body: &str) -> Result<()> {
        tracing::info!(subject, "Run report\n{body}");
        Ok(())
    }
}

/// Keeps notifications in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: RefCell<Vec<(String, String)>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subject and body of every notification sent.
    #[must_use]
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.borrow().clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, subject: &str, body: &str) -> Result<()> {
        self.sent
            .borrow_mut()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_records() {
        let notifier = MemoryNotifier::new();
        notifier.notify("IGEDD Scraper (Errors: 0 | New: 1 )", "body").unwrap();
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(notifier.sent()[0].1, "body");
    }

    #[test]
    fn test_log_notifier_never_fails() {
        assert!(LogNotifier.notify("subject", "body").is_ok());
    }
}
