//! Aggregate result of one batch submission.

use crate::error::ErrorKind;

/// One failed batch item. Indices are 1-based so the operator can resubmit
/// exactly the items that failed.
#[derive(Debug, Clone)]
pub struct SubmissionFailure {
    pub index: usize,
    pub title: String,
    pub kind: ErrorKind,
}

/// Result of one `submit_batch` call. Produced once per batch, not persisted.
#[derive(Debug, Default)]
pub struct SubmissionResult {
    pub created: usize,
    pub failures: Vec<SubmissionFailure>,
}

impl SubmissionResult {
    /// How many items were driven at all.
    pub fn attempted(&self) -> usize {
        self.created + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn record_success(&mut self) {
        self.created += 1;
    }

    pub fn record_failure(&mut self, index: usize, title: impl Into<String>, kind: ErrorKind) {
        self.failures.push(SubmissionFailure {
            index,
            title: title.into(),
            kind,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_and_failures_add_up() {
        let mut result = SubmissionResult::default();
        result.record_success();
        result.record_failure(2, "Сломанный баг", ErrorKind::FormNotReady);
        result.record_success();

        assert_eq!(result.created, 2);
        assert_eq!(result.attempted(), 3);
        assert!(!result.is_clean());
        assert_eq!(result.failures[0].index, 2);
        assert_eq!(result.failures[0].kind, ErrorKind::FormNotReady);
    }
}
