//! Shared API request/response types

use serde::{Deserialize, Serialize};

/// Standard error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_guid: String,
}

/// Outcome tally for batch membership adds (drag-drop and paste)
///
/// Per-item failures are collected rather than aborting the batch; the
/// caller decides how to present the mix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddReport {
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl AddReport {
    pub fn record_success(&mut self) {
        self.successful += 1;
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failed += 1;
        self.errors.push(message.into());
    }

    pub fn total(&self) -> usize {
        self.successful + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_report_tallies_mixed_outcomes() {
        let mut report = AddReport::default();
        report.record_success();
        report.record_success();
        report.record_failure("track missing");

        assert_eq!(report.successful, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.total(), 3);
        assert_eq!(report.errors.len(), 1);
    }
}
