use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;

use dentascan_core::annotation::domain::annotation_renderer::AnnotationRenderer;
use dentascan_core::annotation::infrastructure::box_overlay_renderer::BoxOverlayRenderer;
use dentascan_core::catalog::anomaly_catalog::AnomalyCatalog;
use dentascan_core::charting::anomaly_assigner::AssignmentPolicy;
use dentascan_core::charting::chart_engine::DentalChartEngine;
use dentascan_core::detection::domain::object_detector::ObjectDetector;
use dentascan_core::detection::infrastructure::json_detection_source::JsonDetectionSource;
use dentascan_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use dentascan_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use dentascan_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use dentascan_core::pipeline::analyze_radiograph_use_case::AnalyzeRadiographUseCase;
use dentascan_core::pipeline::pipeline_logger::LogPipelineLogger;
use dentascan_core::shared::constants::IMAGE_EXTENSIONS;
use dentascan_core::shared::settings::EngineSettings;

/// Tooth numbering and anomaly charting for panoramic dental radiographs.
#[derive(Parser)]
#[command(name = "dentascan")]
struct Cli {
    /// Input radiograph image.
    input: PathBuf,

    /// Output path for the annotated radiograph.
    output: PathBuf,

    /// ONNX tooth detection model.
    #[arg(long, conflicts_with = "detections")]
    teeth_model: Option<PathBuf>,

    /// ONNX anomaly detection model.
    #[arg(long, conflicts_with = "detections")]
    anomaly_model: Option<PathBuf>,

    /// Pre-computed detections JSON ({"teeth": [...], "anomalies": [...]}) used instead of models.
    #[arg(long)]
    detections: Option<PathBuf>,

    /// Anomaly catalog JSON (defaults to the built-in 14-class table).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Minimum IoU for attributing an anomaly to a tooth (0.0-1.0).
    #[arg(long)]
    iou_threshold: Option<f64>,

    /// TrueType font for label text (defaults to a system font when found).
    #[arg(long)]
    font: Option<PathBuf>,

    /// Write the tooth report JSON here instead of stdout.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Also write the annotation instructions as JSON.
    #[arg(long)]
    annotations: Option<PathBuf>,

    /// Store this run's confidence, IoU threshold, models, catalog and font as defaults.
    #[arg(long)]
    save_settings: bool,
}

/// Flags merged over persisted settings.
struct RunConfig {
    input: PathBuf,
    output: PathBuf,
    teeth_model: Option<PathBuf>,
    anomaly_model: Option<PathBuf>,
    detections: Option<PathBuf>,
    catalog: Option<PathBuf>,
    confidence: f64,
    iou_threshold: f64,
    font: Option<PathBuf>,
    report: Option<PathBuf>,
    annotations: Option<PathBuf>,
    save_settings: bool,
    persisted: EngineSettings,
}

impl RunConfig {
    fn new(cli: Cli, settings: EngineSettings) -> Self {
        let use_models = cli.detections.is_none();
        let persisted = settings.clone();
        Self {
            input: cli.input,
            output: cli.output,
            teeth_model: cli
                .teeth_model
                .or(settings.teeth_model.filter(|_| use_models)),
            anomaly_model: cli
                .anomaly_model
                .or(settings.anomaly_model.filter(|_| use_models)),
            detections: cli.detections,
            catalog: cli.catalog.or(settings.catalog),
            confidence: cli.confidence.unwrap_or(settings.confidence),
            iou_threshold: cli.iou_threshold.unwrap_or(settings.iou_threshold),
            font: cli.font.or(settings.font),
            report: cli.report,
            annotations: cli.annotations,
            save_settings: cli.save_settings,
            persisted,
        }
    }

    /// Settings to persist. Stored model paths survive a `--detections` run.
    fn to_settings(&self) -> EngineSettings {
        EngineSettings {
            confidence: self.confidence,
            iou_threshold: self.iou_threshold,
            teeth_model: self
                .teeth_model
                .clone()
                .or_else(|| self.persisted.teeth_model.clone()),
            anomaly_model: self
                .anomaly_model
                .clone()
                .or_else(|| self.persisted.anomaly_model.clone()),
            catalog: self.catalog.clone(),
            font: self.font.clone(),
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = RunConfig::new(Cli::parse(), EngineSettings::load());
    validate(&config)?;
    if config.save_settings {
        let path = EngineSettings::config_path().ok_or("No config directory on this platform")?;
        config.to_settings().save_to(&path)?;
        log::info!("Settings saved to {}", path.display());
    }

    let (tooth_detector, anomaly_detector) = build_detectors(&config)?;
    let engine = Arc::new(DentalChartEngine::new(
        load_catalog(config.catalog.as_deref())?,
        AssignmentPolicy {
            iou_threshold: config.iou_threshold,
        },
    ));
    let renderer: Box<dyn AnnotationRenderer> = match &config.font {
        Some(path) => Box::new(BoxOverlayRenderer::with_font_path(path)?),
        None => Box::new(BoxOverlayRenderer::with_system_font()),
    };

    let mut use_case = AnalyzeRadiographUseCase::new(
        Box::new(ImageFileReader::new()),
        Box::new(ImageFileWriter::new()),
        tooth_detector,
        anomaly_detector,
        engine,
        renderer,
        Box::new(LogPipelineLogger::new()),
    );
    let outcome = use_case.execute(&config.input, &config.output)?;

    let report_json = serde_json::to_string_pretty(&outcome.report)?;
    match &config.report {
        Some(path) => {
            fs::write(path, report_json)?;
            log::info!("Report written to {}", path.display());
        }
        None => println!("{report_json}"),
    }

    if let Some(path) = &config.annotations {
        fs::write(path, serde_json::to_string_pretty(&outcome.annotations)?)?;
        log::info!("Annotations written to {}", path.display());
    }

    Ok(())
}

type DetectorPair = (Box<dyn ObjectDetector>, Box<dyn ObjectDetector>);

fn build_detectors(config: &RunConfig) -> Result<DetectorPair, Box<dyn std::error::Error>> {
    if let Some(path) = &config.detections {
        log::info!("Using pre-computed detections from {}", path.display());
        let (teeth, anomalies) =
            JsonDetectionSource::load(path)?.into_detectors(config.confidence);
        return Ok((Box::new(teeth), Box::new(anomalies)));
    }

    let (Some(teeth_model), Some(anomaly_model)) = (&config.teeth_model, &config.anomaly_model)
    else {
        return Err("Both --teeth-model and --anomaly-model are required".into());
    };
    Ok((
        Box::new(OnnxYoloDetector::new(teeth_model, config.confidence)?),
        Box::new(OnnxYoloDetector::new(anomaly_model, config.confidence)?),
    ))
}

fn load_catalog(path: Option<&Path>) -> Result<AnomalyCatalog, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(AnomalyCatalog::load(path)?),
        None => Ok(AnomalyCatalog::default()),
    }
}

fn validate(config: &RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    if !config.input.exists() {
        return Err(format!("Input file not found: {}", config.input.display()).into());
    }
    if !is_image(&config.output) {
        return Err(format!(
            "Output must be an image file ({}), got {}",
            IMAGE_EXTENSIONS.join(", "),
            config.output.display()
        )
        .into());
    }
    match &config.detections {
        Some(path) if !path.exists() => {
            return Err(format!("Detections file not found: {}", path.display()).into());
        }
        Some(_) => {}
        None => {
            if config.teeth_model.is_none() || config.anomaly_model.is_none() {
                return Err(
                    "Either --detections or both --teeth-model and --anomaly-model are required"
                        .into(),
                );
            }
        }
    }
    if !(0.0..=1.0).contains(&config.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            config.confidence
        )
        .into());
    }
    if !(0.0..=1.0).contains(&config.iou_threshold) {
        return Err(format!(
            "IoU threshold must be between 0.0 and 1.0, got {}",
            config.iou_threshold
        )
        .into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
