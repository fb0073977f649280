use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::charting::report::Report;

/// Latest report per client session.
///
/// A hosting layer stores each finished analysis under the caller's session
/// key and serves "fetch my last report" from here. Sessions never see each
/// other's reports.
///
/// Entries are never evicted on their own: the host calls [`remove`] when a
/// session ends.
///
/// [`remove`]: SessionReports::remove
#[derive(Default)]
pub struct SessionReports {
    reports: Mutex<HashMap<String, Report>>,
}

impl SessionReports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `report` as the session's latest, returning the one it replaced.
    pub fn store(&self, session: &str, report: Report) -> Option<Report> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.to_string(), report)
    }

    /// The session's latest report, or `None` when it has not analyzed
    /// anything yet.
    pub fn get(&self, session: &str) -> Option<Report> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session)
            .cloned()
    }

    /// Drops the session's report, returning it if there was one.
    pub fn remove(&self, session: &str) -> Option<Report> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session)
    }

    pub fn len(&self) -> usize {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
