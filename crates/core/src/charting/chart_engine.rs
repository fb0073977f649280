use serde::Serialize;

use crate::catalog::anomaly_catalog::{AnomalyCatalog, AnomalyClass};
use crate::charting::annotation_instruction::AnnotationInstruction;
use crate::charting::anomaly_assigner::{AnomalyAssigner, Assignment, AssignmentPolicy};
use crate::charting::report::{Report, ReportBuilder};
use crate::charting::tooth_layout_resolver::{ToothLayoutResolver, ToothMap};
use crate::detection::domain::detections::{AnomalyDetection, ToothDetection};
use crate::shared::error::Result;

/// Everything produced for one radiograph. Owned by the caller; nothing is
/// retained by the engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartOutcome {
    #[serde(skip)]
    pub tooth_map: ToothMap,
    pub assignments: Vec<Assignment>,
    pub report: Report,
    pub annotations: Vec<AnnotationInstruction>,
}

/// Numbers the teeth, attributes anomalies and builds the report.
///
/// Holds only immutable configuration, so one engine can serve concurrent
/// requests through a shared reference.
pub struct DentalChartEngine {
    catalog: AnomalyCatalog,
    resolver: ToothLayoutResolver,
    assigner: AnomalyAssigner,
}

impl DentalChartEngine {
    pub fn new(catalog: AnomalyCatalog, policy: AssignmentPolicy) -> Self {
        Self {
            catalog,
            resolver: ToothLayoutResolver::new(),
            assigner: AnomalyAssigner::new(policy),
        }
    }

    pub fn catalog(&self) -> &AnomalyCatalog {
        &self.catalog
    }

    /// Charts one radiograph.
    ///
    /// Fails with `UnknownClassId` before doing any work if an anomaly class
    /// is missing from the catalog. Empty inputs yield an empty report.
    pub fn chart(
        &self,
        teeth: &[ToothDetection],
        anomalies: &[AnomalyDetection],
    ) -> Result<ChartOutcome> {
        let classes: Vec<&AnomalyClass> = anomalies
            .iter()
            .map(|a| self.catalog.lookup(a.class_id))
            .collect::<Result<_>>()?;

        let tooth_map = self.resolver.resolve(teeth);
        let assignments = self.assigner.assign(anomalies, &tooth_map);

        let mut builder = ReportBuilder::new();
        for a in &assignments {
            builder.record(a.tooth_id, &classes[a.anomaly_index].full_name);
        }
        let report = builder.build();

        let annotations = anomalies
            .iter()
            .zip(&classes)
            .map(|(anomaly, class)| AnnotationInstruction {
                bbox: anomaly.bbox,
                color: class.color,
                label: class.abbreviation.clone(),
            })
            .collect();

        log::info!(
            "Charted {} teeth and {} anomalies: {} assignments, {} affected teeth",
            tooth_map.len(),
            anomalies.len(),
            assignments.len(),
            report.affected_teeth().len()
        );

        Ok(ChartOutcome {
            tooth_map,
            assignments,
            report,
            annotations,
        })
    }
}

impl Default for DentalChartEngine {
    fn default() -> Self {
        Self::new(AnomalyCatalog::default(), AssignmentPolicy::default())
    }
}
