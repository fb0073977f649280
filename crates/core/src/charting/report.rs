use std::collections::BTreeMap;

use serde::Serialize;

use crate::shared::constants::TOOTH_SLOTS;

/// Per-tooth anomaly summary for one radiograph.
///
/// Always holds exactly the keys `1..=32`; a tooth without findings maps to
/// an empty list. Serializes as a JSON object with string keys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    teeth: BTreeMap<u8, Vec<String>>,
}

impl Report {
    /// Anomaly names on a tooth, or `None` for ids outside `1..=32`.
    pub fn anomalies(&self, tooth_id: u8) -> Option<&[String]> {
        self.teeth.get(&tooth_id).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, &[String])> {
        self.teeth.iter().map(|(&id, names)| (id, names.as_slice()))
    }

    /// Ids of teeth with at least one finding, ascending.
    pub fn affected_teeth(&self) -> Vec<u8> {
        self.iter()
            .filter(|(_, names)| !names.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn is_clear(&self) -> bool {
        self.teeth.values().all(Vec::is_empty)
    }
}

/// Accumulates assignments into a [`Report`].
///
/// Names are kept in first-seen order and recorded at most once per tooth.
pub struct ReportBuilder {
    report: Report,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            report: Report {
                teeth: (1..=TOOTH_SLOTS).map(|id| (id, Vec::new())).collect(),
            },
        }
    }

    /// Adds `name` to a tooth. Returns `false` when it was already listed or
    /// the id is outside the report.
    pub fn record(&mut self, tooth_id: usize, name: &str) -> bool {
        let slot = u8::try_from(tooth_id)
            .ok()
            .and_then(|id| self.report.teeth.get_mut(&id));
        let Some(names) = slot else {
            log::warn!("Ignoring finding '{name}' for tooth {tooth_id}: no such slot");
            return false;
        };
        if names.iter().any(|n| n == name) {
            return false;
        }
        names.push(name.to_string());
        true
    }

    pub fn build(self) -> Report {
        self.report
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
