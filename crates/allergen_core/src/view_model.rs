use std::fmt;

use crate::item::ScrapeResult;

/// "N of M succeeded" view over a finished or running scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanSummary {
    pub total: usize,
    pub succeeded: usize,
}

impl ScanSummary {
    pub fn from_results(results: &[ScrapeResult]) -> Self {
        Self {
            total: results.len(),
            succeeded: results.iter().filter(|r| r.is_success()).count(),
        }
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} succeeded", self.succeeded, self.total)
    }
}
