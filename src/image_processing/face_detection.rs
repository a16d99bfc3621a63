use anyhow::{Context, Result};
use image::{imageops, GrayImage, RgbImage};
use imageproc::contrast::equalize_histogram;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::trimming::{self, FaceDetection, Rect, TrimError};

pub const DEFAULT_SCALE_FACTOR: f64 = 1.01;
pub const DEFAULT_NEIGHBORS: u32 = 3;
pub const DEFAULT_MIN_RATIO: f64 = 0.05;

/// Smallest face rustface can look for
const RUSTFACE_MIN_FACE_SIZE: u32 = 20;

/// Knobs handed to the detector, named after the classic cascade parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    /// Growth between pyramid levels, > 1.0 (1.01 = 1% per level)
    pub scale_factor: f64,
    /// How much agreement a candidate needs before it is reported
    pub min_neighbors: u32,
    /// Minimum face side as a fraction of the shorter image side, 0 disables
    pub min_size_ratio: f64,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_NEIGHBORS,
            min_size_ratio: DEFAULT_MIN_RATIO,
        }
    }
}

impl DetectionParams {
    /// Minimum face side in pixels for an image of the given size
    pub fn min_face_size(&self, width: u32, height: u32) -> Option<u32> {
        if self.min_size_ratio > 0.0 {
            let shorter = width.min(height);
            Some((shorter as f64 * self.min_size_ratio) as u32)
        } else {
            None
        }
    }
}

/// Pluggable face detection backend.
///
/// Receives an already equalized grayscale image.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, gray: &GrayImage, params: &DetectionParams) -> Result<Vec<FaceDetection>>;
}

/// Face detector backed by the `rustface` crate (SeetaFace engine)
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    /// Load a SeetaFace model file such as `seeta_fd_frontal_v1.0.bin`
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open detector model: {}", path.display()))?;

        let model = rustface::read_model(BufReader::new(file)).map_err(|e| TrimError::ModelLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { model })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &GrayImage, params: &DetectionParams) -> Result<Vec<FaceDetection>> {
        let (width, height) = gray.dimensions();
        let min_face_size = params
            .min_face_size(width, height)
            .unwrap_or(RUSTFACE_MIN_FACE_SIZE)
            .max(RUSTFACE_MIN_FACE_SIZE);

        // Nothing that small can hold a face
        if width.min(height) < min_face_size {
            return Ok(Vec::new());
        }

        // rustface detectors carry per-run state, so each call gets its own
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_pyramid_scale_factor(pyramid_step(params.scale_factor));
        detector.set_min_face_size(min_face_size);
        detector.set_score_thresh(params.min_neighbors as f64);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));

        Ok(faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceDetection::new(
                    Rect::new(bbox.x(), bbox.y(), bbox.width() as i32, bbox.height() as i32),
                    face.score(),
                )
            })
            .collect())
    }
}

/// rustface shrinks the image by a factor below 1.0 per pyramid level
fn pyramid_step(scale_factor: f64) -> f32 {
    if scale_factor <= 0.0 {
        return 0.99;
    }
    (1.0 / scale_factor).clamp(0.01, 0.99) as f32
}

/// Grayscale plus histogram equalization, the input every detector expects
pub fn prepare_for_detection(img: &RgbImage) -> GrayImage {
    equalize_histogram(&imageops::grayscale(img))
}

/// Detection output and the crop chosen from it
#[derive(Debug, Clone, Serialize)]
pub struct TrimResult {
    pub region: Rect,
    /// Detected faces with weights scaled into `[0, 1]`
    pub faces: Vec<FaceDetection>,
    pub image_width: u32,
    pub image_height: u32,
}

/// Detect faces in `img` and pick the square crop that keeps the most of them
pub fn calc_trim_region(
    img: &RgbImage,
    detector: &dyn FaceDetector,
    params: &DetectionParams,
) -> Result<TrimResult> {
    let (width, height) = img.dimensions();
    let gray = prepare_for_detection(img);

    let mut faces = detector.detect(&gray, params)?;

    let mut weights: Vec<f64> = faces.iter().map(|f| f.weight).collect();
    trimming::normalize_weights(&mut weights);
    for (face, weight) in faces.iter_mut().zip(weights) {
        face.weight = weight;
    }

    let rects: Vec<Rect> = faces.iter().map(|f| f.rect).collect();
    let region = trimming::try_search(&rects, width as i32, height as i32)?;

    Ok(TrimResult {
        region,
        faces,
        image_width: width,
        image_height: height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};
    use std::sync::Mutex;

    /// Detector returning canned faces and recording what it was given
    struct FixedDetector {
        faces: Vec<FaceDetection>,
        seen: Mutex<Option<(u32, u32)>>,
    }

    impl FixedDetector {
        fn new(faces: Vec<FaceDetection>) -> Self {
            Self {
                faces,
                seen: Mutex::new(None),
            }
        }
    }

    impl FaceDetector for FixedDetector {
        fn detect(&self, gray: &GrayImage, _params: &DetectionParams) -> Result<Vec<FaceDetection>> {
            *self.seen.lock().unwrap() = Some(gray.dimensions());
            Ok(self.faces.clone())
        }
    }

    fn create_test_image(width: u32, height: u32) -> RgbImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        })
    }

    #[test]
    fn test_default_params() {
        let params = DetectionParams::default();
        assert_eq!(params.scale_factor, 1.01);
        assert_eq!(params.min_neighbors, 3);
        assert_eq!(params.min_size_ratio, 0.05);
    }

    #[test]
    fn test_min_face_size() {
        let params = DetectionParams {
            min_size_ratio: 0.1,
            ..Default::default()
        };
        assert_eq!(params.min_face_size(800, 600), Some(60));

        let disabled = DetectionParams {
            min_size_ratio: 0.0,
            ..Default::default()
        };
        assert_eq!(disabled.min_face_size(800, 600), None);
    }

    #[test]
    fn test_pyramid_step() {
        assert!((pyramid_step(1.25) - 0.8).abs() < 1e-6);
        assert_eq!(pyramid_step(1.0), 0.99);
        assert_eq!(pyramid_step(0.0), 0.99);
        assert_eq!(pyramid_step(1000.0), 0.01);
    }

    #[test]
    fn test_prepare_for_detection_keeps_dimensions() {
        let img = create_test_image(64, 32);
        let gray = prepare_for_detection(&img);
        assert_eq!(gray.dimensions(), (64, 32));
    }

    #[test]
    fn test_equalization_stretches_contrast() {
        let img: RgbImage = ImageBuffer::from_fn(16, 16, |x, _| {
            let v = if x < 8 { 100 } else { 110 };
            Rgb([v, v, v])
        });
        let gray = prepare_for_detection(&img);
        let lo = gray.pixels().map(|Luma([v])| *v).min().unwrap();
        let hi = gray.pixels().map(|Luma([v])| *v).max().unwrap();
        assert!(hi - lo > 10);
    }

    #[test]
    fn test_calc_trim_region_without_faces() {
        let img = create_test_image(200, 100);
        let detector = FixedDetector::new(vec![]);
        let result = calc_trim_region(&img, &detector, &DetectionParams::default()).unwrap();

        assert_eq!(result.region, Rect::new(50, 0, 100, 100));
        assert!(result.faces.is_empty());
        assert_eq!(*detector.seen.lock().unwrap(), Some((200, 100)));
    }

    #[test]
    fn test_calc_trim_region_normalizes_weights() {
        let img = create_test_image(300, 100);
        let detector = FixedDetector::new(vec![
            FaceDetection::new(Rect::new(120, 30, 20, 20), 4.0),
            FaceDetection::new(Rect::new(130, 60, 10, 10), 2.0),
        ]);
        let result = calc_trim_region(&img, &detector, &DetectionParams::default()).unwrap();

        let weights: Vec<f64> = result.faces.iter().map(|f| f.weight).collect();
        assert_eq!(weights, vec![1.0, 0.0]);
        assert_eq!((result.image_width, result.image_height), (300, 100));
        assert!(result.region.is_within(300, 100));
    }

    #[test]
    fn test_calc_trim_region_weights_do_not_move_crop() {
        let img = create_test_image(300, 100);
        let heavy = FixedDetector::new(vec![FaceDetection::new(Rect::new(120, 30, 20, 20), 50.0)]);
        let light = FixedDetector::new(vec![FaceDetection::new(Rect::new(120, 30, 20, 20), 0.1)]);
        let params = DetectionParams::default();

        let a = calc_trim_region(&img, &heavy, &params).unwrap();
        let b = calc_trim_region(&img, &light, &params).unwrap();
        assert_eq!(a.region, b.region);
        assert_eq!(a.region, Rect::new(80, 0, 100, 100));
    }

    #[test]
    fn test_missing_model_file() {
        let result = RustfaceDetector::from_path(Path::new("/nonexistent/model.bin"));
        assert!(result.is_err());
    }
}
