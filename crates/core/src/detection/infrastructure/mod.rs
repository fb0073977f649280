pub mod json_detection_source;
pub mod onnx_yolo_detector;
