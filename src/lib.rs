// Library exports for reuse by the CLI and other applications
pub mod cli;
pub mod config_file;
pub mod image_processing;
pub mod json_output;
pub mod trimming;
pub mod utils;

// Re-export commonly used types
pub use image_processing::{
    calc_trim_region, DetectionParams, FaceDetector, ProcessingConfig, ProcessingEngine,
    ProcessingResult, RustfaceDetector, TrimResult,
};
pub use json_output::JsonMessage;
pub use trimming::{search, try_search, FaceDetection, Point, Rect, TrimError};
