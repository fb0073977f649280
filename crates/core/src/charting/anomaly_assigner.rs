use serde::Serialize;

use crate::charting::tooth_layout_resolver::ToothMap;
use crate::detection::domain::detections::AnomalyDetection;
use crate::shared::bounding_box::{iou, overlaps};
use crate::shared::constants::DEFAULT_IOU_THRESHOLD;

/// Which rule attributed an anomaly to a tooth.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchRule {
    /// IoU strictly above the policy threshold.
    Iou,
    /// Plain box intersection, used only when no tooth passed the IoU rule.
    Overlap,
}

/// One anomaly attributed to one tooth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Assignment {
    pub anomaly_index: usize,
    pub tooth_id: usize,
    /// IoU between the anomaly and the tooth.
    pub score: f64,
    pub rule: MatchRule,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AssignmentPolicy {
    pub iou_threshold: f64,
}

impl Default for AssignmentPolicy {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
        }
    }
}

/// Attributes anomaly boxes to numbered teeth.
///
/// Every tooth whose IoU with the anomaly exceeds the threshold receives it,
/// so an interproximal lesion lands on both neighbours. When no tooth passes,
/// every tooth whose box touches the anomaly receives it instead. An anomaly
/// touching no tooth yields no assignment.
pub struct AnomalyAssigner {
    policy: AssignmentPolicy,
}

impl AnomalyAssigner {
    pub fn new(policy: AssignmentPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AssignmentPolicy {
        self.policy
    }

    /// Assignments for all anomalies, grouped by anomaly in input order and
    /// by tooth id within an anomaly.
    pub fn assign(&self, anomalies: &[AnomalyDetection], teeth: &ToothMap) -> Vec<Assignment> {
        anomalies
            .iter()
            .enumerate()
            .flat_map(|(idx, anomaly)| self.assign_one(idx, anomaly, teeth))
            .collect()
    }

    pub fn assign_one(
        &self,
        anomaly_index: usize,
        anomaly: &AnomalyDetection,
        teeth: &ToothMap,
    ) -> Vec<Assignment> {
        let scored: Vec<(usize, f64)> = teeth
            .iter()
            .map(|(id, tooth)| (id, iou(&anomaly.bbox, &tooth.bbox)))
            .collect();

        let primary: Vec<Assignment> = scored
            .iter()
            .filter(|&&(_, score)| score > self.policy.iou_threshold)
            .map(|&(tooth_id, score)| Assignment {
                anomaly_index,
                tooth_id,
                score,
                rule: MatchRule::Iou,
            })
            .collect();
        if !primary.is_empty() {
            log::debug!(
                "Anomaly {anomaly_index} matched teeth {:?} by IoU",
                primary.iter().map(|a| a.tooth_id).collect::<Vec<_>>()
            );
            return primary;
        }

        let fallback: Vec<Assignment> = scored
            .iter()
            .filter(|&&(tooth_id, _)| {
                teeth
                    .get(tooth_id)
                    .is_some_and(|tooth| overlaps(&anomaly.bbox, &tooth.bbox))
            })
            .map(|&(tooth_id, score)| Assignment {
                anomaly_index,
                tooth_id,
                score,
                rule: MatchRule::Overlap,
            })
            .collect();
        if fallback.is_empty() {
            log::debug!("Anomaly {anomaly_index} touches no tooth");
        } else {
            log::debug!(
                "Anomaly {anomaly_index} matched teeth {:?} by overlap",
                fallback.iter().map(|a| a.tooth_id).collect::<Vec<_>>()
            );
        }
        fallback
    }
}

impl Default for AnomalyAssigner {
    fn default() -> Self {
        Self::new(AssignmentPolicy::default())
    }
}
