//! Crop-region search over detected face rectangles.
//!
//! Everything in here is pure integer geometry: no image buffers, no I/O.
//! [`search`] picks the square window that retains the largest share of
//! every face, [`coverage::evaluate`] scores a single candidate window.

pub mod coverage;
pub mod numeric;
pub mod search;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use coverage::{evaluate, Coverage};
pub use numeric::normalize_weights;
pub use search::{search, search_parallel, try_search};

/// Axis-aligned integer rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Area in pixels, widened so that large images cannot overflow
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// True when the rectangle lies inside `[0, width) x [0, height)`
    pub fn is_within(&self, width: i32, height: i32) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= width && self.bottom() <= height
    }
}

/// Integer point used for face centroids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A face rectangle reported by a detector together with its confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    #[serde(rename = "box")]
    pub rect: Rect,
    /// Detector confidence, arbitrary scale until normalized
    pub weight: f64,
}

impl FaceDetection {
    pub fn new(rect: Rect, weight: f64) -> Self {
        Self { rect, weight }
    }
}

#[derive(Debug, Error)]
pub enum TrimError {
    #[error("image dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("failed to load detector model {path}: {reason}")]
    ModelLoad { path: String, reason: String },

    #[error("crop region {region:?} exceeds {width}x{height} image bounds")]
    CropOutOfBounds { region: Rect, width: u32, height: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges_and_area() {
        let rect = Rect::new(10, 20, 30, 40);
        assert_eq!(rect.left(), 10);
        assert_eq!(rect.right(), 40);
        assert_eq!(rect.top(), 20);
        assert_eq!(rect.bottom(), 60);
        assert_eq!(rect.area(), 1200);
    }

    #[test]
    fn test_rect_area_does_not_overflow() {
        let rect = Rect::new(0, 0, 100_000, 100_000);
        assert_eq!(rect.area(), 10_000_000_000);
    }

    #[test]
    fn test_rect_is_within() {
        assert!(Rect::new(0, 0, 100, 100).is_within(100, 100));
        assert!(Rect::new(50, 0, 100, 100).is_within(200, 100));
        assert!(!Rect::new(101, 0, 100, 100).is_within(200, 100));
        assert!(!Rect::new(-1, 0, 10, 10).is_within(200, 100));
    }

    #[test]
    fn test_face_detection_serializes_box_field() {
        let face = FaceDetection::new(Rect::new(1, 2, 3, 4), 0.5);
        let json = serde_json::to_value(face).unwrap();
        assert_eq!(json["box"]["width"], 3);
        assert_eq!(json["weight"], 0.5);
    }
}
