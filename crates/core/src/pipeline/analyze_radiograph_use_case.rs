use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::annotation::domain::annotation_renderer::AnnotationRenderer;
use crate::charting::chart_engine::{ChartOutcome, DentalChartEngine};
use crate::detection::domain::detections::{ingest_anomalies, ingest_teeth};
use crate::detection::domain::object_detector::ObjectDetector;
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::domain::image_writer::ImageWriter;
use crate::pipeline::pipeline_logger::PipelineLogger;

/// Single-radiograph pipeline: read → detect teeth → detect anomalies →
/// chart → render → write.
///
/// The chart outcome goes back to the caller; nothing from one run is kept
/// for the next. The engine is shared so several use cases (one per worker
/// or session) can chart concurrently.
pub struct AnalyzeRadiographUseCase {
    reader: Box<dyn ImageReader>,
    image_writer: Box<dyn ImageWriter>,
    tooth_detector: Box<dyn ObjectDetector>,
    anomaly_detector: Box<dyn ObjectDetector>,
    engine: Arc<DentalChartEngine>,
    renderer: Box<dyn AnnotationRenderer>,
    logger: Box<dyn PipelineLogger>,
}

impl AnalyzeRadiographUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader: Box<dyn ImageReader>,
        image_writer: Box<dyn ImageWriter>,
        tooth_detector: Box<dyn ObjectDetector>,
        anomaly_detector: Box<dyn ObjectDetector>,
        engine: Arc<DentalChartEngine>,
        renderer: Box<dyn AnnotationRenderer>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            reader,
            image_writer,
            tooth_detector,
            anomaly_detector,
            engine,
            renderer,
            logger,
        }
    }

    /// Analyzes the radiograph at `input_path` and writes the annotated copy
    /// to `output_path`.
    ///
    /// Nothing is written when charting fails.
    pub fn execute(
        &mut self,
        input_path: &Path,
        output_path: &Path,
    ) -> Result<ChartOutcome, Box<dyn std::error::Error>> {
        let start = Instant::now();
        let mut image = self.reader.read(input_path)?;
        self.stage_done("read", start);

        let start = Instant::now();
        let teeth = ingest_teeth(&self.tooth_detector.detect(&image)?);
        self.stage_done("teeth", start);

        let start = Instant::now();
        let anomalies = ingest_anomalies(&self.anomaly_detector.detect(&image)?);
        self.stage_done("anomalies", start);

        let start = Instant::now();
        let outcome = self.engine.chart(&teeth, &anomalies)?;
        self.stage_done("chart", start);

        let start = Instant::now();
        self.renderer.render(&mut image, &outcome.annotations)?;
        self.image_writer.write(output_path, &image)?;
        self.stage_done("render", start);

        self.logger.metric("teeth", outcome.tooth_map.len() as f64);
        self.logger.metric("anomalies", anomalies.len() as f64);
        self.logger
            .metric("affected_teeth", outcome.report.affected_teeth().len() as f64);
        self.logger.info(&format!(
            "Annotated radiograph written to {}",
            output_path.display()
        ));
        self.logger.summary();

        Ok(outcome)
    }

    fn stage_done(&mut self, stage: &str, start: Instant) {
        self.logger
            .timing(stage, start.elapsed().as_secs_f64() * 1000.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charting::annotation_instruction::AnnotationInstruction;
    use crate::detection::domain::detections::RawDetection;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::error::DentalError;
    use crate::shared::radiograph::Radiograph;
    use std::path::PathBuf;
    use std::sync::Mutex;

    const CARIES: usize = 4;

    // --- Stubs ---

    struct StubImageReader {
        width: u32,
        height: u32,
    }

    impl ImageReader for StubImageReader {
        fn read(&self, _path: &Path) -> Result<Radiograph, Box<dyn std::error::Error>> {
            let len = (self.width * self.height * 3) as usize;
            Ok(Radiograph::new(vec![0; len], self.width, self.height))
        }
    }

    #[derive(Clone, Default)]
    struct StubImageWriter {
        written: Arc<Mutex<Vec<(PathBuf, Radiograph)>>>,
    }

    impl ImageWriter for StubImageWriter {
        fn write(&self, path: &Path, image: &Radiograph) -> Result<(), Box<dyn std::error::Error>> {
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), image.clone()));
            Ok(())
        }
    }

    struct StubDetector {
        detections: Vec<RawDetection>,
    }

    impl ObjectDetector for StubDetector {
        fn detect(
            &mut self,
            _image: &Radiograph,
        ) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
            Ok(self.detections.clone())
        }
    }

    struct FailingDetector;

    impl ObjectDetector for FailingDetector {
        fn detect(
            &mut self,
            _image: &Radiograph,
        ) -> Result<Vec<RawDetection>, Box<dyn std::error::Error>> {
            Err("model not loaded".into())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingRenderer {
        calls: Arc<Mutex<Vec<Vec<AnnotationInstruction>>>>,
    }

    impl AnnotationRenderer for RecordingRenderer {
        fn render(
            &self,
            _image: &mut Radiograph,
            instructions: &[AnnotationInstruction],
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.calls.lock().unwrap().push(instructions.to_vec());
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingLogger {
        stages: Arc<Mutex<Vec<String>>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.stages.lock().unwrap().push(stage.to_string());
        }
        fn metric(&mut self, _name: &str, _value: f64) {}
        fn info(&mut self, _message: &str) {}
    }

    // --- Helpers ---

    fn raw(bbox: [f64; 4], class_id: usize) -> RawDetection {
        RawDetection {
            bbox,
            class_id,
            confidence: 0.9,
        }
    }

    /// Two upper and two lower 100x200 teeth.
    fn four_teeth() -> Vec<RawDetection> {
        vec![
            raw([0.0, 0.0, 100.0, 200.0], 0),
            raw([100.0, 0.0, 200.0, 200.0], 0),
            raw([0.0, 400.0, 100.0, 600.0], 0),
            raw([200.0, 400.0, 300.0, 600.0], 0),
        ]
    }

    fn use_case(
        anomalies: Vec<RawDetection>,
        writer: &StubImageWriter,
        renderer: &RecordingRenderer,
    ) -> AnalyzeRadiographUseCase {
        AnalyzeRadiographUseCase::new(
            Box::new(StubImageReader {
                width: 400,
                height: 700,
            }),
            Box::new(writer.clone()),
            Box::new(StubDetector {
                detections: four_teeth(),
            }),
            Box::new(StubDetector {
                detections: anomalies,
            }),
            Arc::new(DentalChartEngine::default()),
            Box::new(renderer.clone()),
            Box::new(NullPipelineLogger),
        )
    }

    // --- Tests ---

    #[test]
    fn test_returns_report_for_detected_anomaly() {
        let writer = StubImageWriter::default();
        let renderer = RecordingRenderer::default();
        let mut uc = use_case(
            vec![raw([0.0, 50.0, 100.0, 110.0], CARIES)],
            &writer,
            &renderer,
        );

        let outcome = uc
            .execute(Path::new("in.png"), Path::new("out.png"))
            .unwrap();

        assert_eq!(outcome.tooth_map.len(), 4);
        assert_eq!(outcome.report.anomalies(1).unwrap(), ["Caries"]);
        assert_eq!(outcome.report.affected_teeth(), vec![1]);
    }

    #[test]
    fn test_annotated_image_written_with_original_dimensions() {
        let writer = StubImageWriter::default();
        let renderer = RecordingRenderer::default();
        let mut uc = use_case(
            vec![raw([0.0, 50.0, 100.0, 110.0], CARIES)],
            &writer,
            &renderer,
        );

        uc.execute(Path::new("in.png"), Path::new("out.png"))
            .unwrap();

        let written = writer.written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, PathBuf::from("out.png"));
        assert_eq!(written[0].1.width(), 400);
        assert_eq!(written[0].1.height(), 700);

        let calls = renderer.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 1);
        assert_eq!(calls[0][0].label, "CAR");
    }

    #[test]
    fn test_degenerate_detections_are_dropped() {
        let writer = StubImageWriter::default();
        let renderer = RecordingRenderer::default();
        let mut uc = use_case(
            vec![
                raw([50.0, 50.0, 50.0, 80.0], CARIES),
                raw([0.0, 50.0, 100.0, 110.0], CARIES),
            ],
            &writer,
            &renderer,
        );

        let outcome = uc
            .execute(Path::new("in.png"), Path::new("out.png"))
            .unwrap();
        assert_eq!(outcome.annotations.len(), 1);
    }

    #[test]
    fn test_unknown_class_writes_nothing() {
        let writer = StubImageWriter::default();
        let renderer = RecordingRenderer::default();
        let mut uc = use_case(
            vec![raw([0.0, 50.0, 100.0, 110.0], 99)],
            &writer,
            &renderer,
        );

        let err = uc
            .execute(Path::new("in.png"), Path::new("out.png"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DentalError>(),
            Some(DentalError::UnknownClassId { class_id: 99, .. })
        ));
        assert!(writer.written.lock().unwrap().is_empty());
        assert!(renderer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_detector_failure_propagates() {
        let writer = StubImageWriter::default();
        let mut uc = AnalyzeRadiographUseCase::new(
            Box::new(StubImageReader {
                width: 10,
                height: 10,
            }),
            Box::new(writer.clone()),
            Box::new(FailingDetector),
            Box::new(StubDetector { detections: vec![] }),
            Arc::new(DentalChartEngine::default()),
            Box::new(RecordingRenderer::default()),
            Box::new(NullPipelineLogger),
        );

        let err = uc
            .execute(Path::new("in.png"), Path::new("out.png"))
            .unwrap_err();
        assert_eq!(err.to_string(), "model not loaded");
        assert!(writer.written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_each_stage_is_timed() {
        let logger = RecordingLogger::default();
        let stages = logger.stages.clone();
        let mut uc = AnalyzeRadiographUseCase::new(
            Box::new(StubImageReader {
                width: 10,
                height: 10,
            }),
            Box::new(StubImageWriter::default()),
            Box::new(StubDetector { detections: vec![] }),
            Box::new(StubDetector { detections: vec![] }),
            Arc::new(DentalChartEngine::default()),
            Box::new(RecordingRenderer::default()),
            Box::new(logger),
        );

        let outcome = uc
            .execute(Path::new("in.png"), Path::new("out.png"))
            .unwrap();

        assert!(outcome.report.is_clear());
        assert_eq!(
            *stages.lock().unwrap(),
            ["read", "teeth", "anomalies", "chart", "render"]
        );
    }

    #[test]
    fn test_runs_are_independent() {
        let writer = StubImageWriter::default();
        let renderer = RecordingRenderer::default();
        let mut uc = use_case(
            vec![raw([0.0, 50.0, 100.0, 110.0], CARIES)],
            &writer,
            &renderer,
        );

        let first = uc.execute(Path::new("a.png"), Path::new("a_out.png")).unwrap();
        let second = uc.execute(Path::new("b.png"), Path::new("b_out.png")).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.report.anomalies(1).unwrap(), ["Caries"]);
    }
}
