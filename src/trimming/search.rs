//! Square crop search along the long image axis.
//!
//! [`search_parallel`] is library API for callers cropping one large image at a
//! time; the CLI already runs one image per rayon worker and uses [`try_search`].

use rayon::prelude::*;

use super::coverage::{evaluate, Coverage};
use super::numeric::{clamp, ranged_clamp};
use super::{Point, Rect, TrimError};

/// Image axis the square window slides along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlideAxis {
    X,
    Y,
}

impl SlideAxis {
    /// Picks the long axis; landscape and square images slide horizontally
    fn for_dimensions(width: i32, height: i32) -> (Self, i32, i32) {
        if width < height {
            (SlideAxis::Y, height, width)
        } else {
            (SlideAxis::X, width, height)
        }
    }

    /// Square window of `side` at `offset` along this axis, 0 on the other
    fn place(self, offset: i32, side: i32) -> Rect {
        match self {
            SlideAxis::X => Rect::new(offset, 0, side, side),
            SlideAxis::Y => Rect::new(0, offset, side, side),
        }
    }

    fn component(self, point: Point) -> i32 {
        match self {
            SlideAxis::X => point.x,
            SlideAxis::Y => point.y,
        }
    }
}

/// Finds the square crop that keeps the most of every face.
///
/// The window side is the shorter image dimension. With no faces the window
/// is centered on the long axis. A square image with faces returns the whole
/// image. Otherwise the first best-scoring window position is taken and the
/// window is re-centered on the centroid of the faces it retains, then pushed
/// back inside the image.
///
/// `width` and `height` must be positive; see [`try_search`] for a checked
/// entry point.
pub fn search(faces: &[Rect], width: i32, height: i32) -> Rect {
    debug_assert!(width > 0 && height > 0, "search needs positive dimensions");

    let (axis, longer, shorter) = SlideAxis::for_dimensions(width, height);

    if faces.is_empty() {
        return axis.place(longer / 2 - shorter / 2, shorter);
    }

    if longer == shorter {
        return Rect::new(0, 0, shorter, shorter);
    }

    let best = candidates(faces, axis, longer, shorter).fold(None, first_max);
    finish(best, axis, shorter, width, height)
}

/// Same result as [`search`], with window positions scored on the rayon pool
pub fn search_parallel(faces: &[Rect], width: i32, height: i32) -> Rect {
    debug_assert!(width > 0 && height > 0, "search needs positive dimensions");

    let (axis, longer, shorter) = SlideAxis::for_dimensions(width, height);

    if faces.is_empty() {
        return axis.place(longer / 2 - shorter / 2, shorter);
    }

    if longer == shorter {
        return Rect::new(0, 0, shorter, shorter);
    }

    let best = (0..longer - shorter)
        .into_par_iter()
        .map(|offset| (offset, evaluate(faces, axis.place(offset, shorter))))
        .filter(|(_, coverage)| coverage.score > 0.0)
        .reduce_with(|a, b| {
            // Equal scores keep the lower offset, whatever order rayon joins in
            if b.1.score > a.1.score || (b.1.score == a.1.score && b.0 < a.0) {
                b
            } else {
                a
            }
        });

    finish(best, axis, shorter, width, height)
}

/// Checked variant of [`search`] that rejects non-positive dimensions
pub fn try_search(faces: &[Rect], width: i32, height: i32) -> Result<Rect, TrimError> {
    if width <= 0 || height <= 0 {
        return Err(TrimError::InvalidDimensions { width, height });
    }
    Ok(search(faces, width, height))
}

/// Every window position along the axis with its coverage, lowest offset first
fn candidates(
    faces: &[Rect],
    axis: SlideAxis,
    longer: i32,
    shorter: i32,
) -> impl Iterator<Item = (i32, Coverage)> + '_ {
    (0..longer - shorter).map(move |offset| (offset, evaluate(faces, axis.place(offset, shorter))))
}

/// Keeps the running maximum; a later candidate must score strictly higher
/// to replace it, and nothing at or below zero ever wins
fn first_max(
    best: Option<(i32, Coverage)>,
    candidate: (i32, Coverage),
) -> Option<(i32, Coverage)> {
    let best_score = best.map_or(0.0, |(_, coverage)| coverage.score);
    if candidate.1.score > best_score {
        Some(candidate)
    } else {
        best
    }
}

/// Re-centers the winning window on its face centroid and clamps it into the image
fn finish(
    best: Option<(i32, Coverage)>,
    axis: SlideAxis,
    shorter: i32,
    width: i32,
    height: i32,
) -> Rect {
    // No positive score anywhere: the unmoved window, centroid at the origin
    let centroid = best.map_or(Point::default(), |(_, coverage)| coverage.centroid);

    // The upper bound is the window side, not the free travel of the window
    let offset = clamp(axis.component(centroid) - shorter / 2, 0, shorter);
    let region = axis.place(offset, shorter);

    Rect::new(
        ranged_clamp(region.x, shorter, 0, width - 1),
        ranged_clamp(region.y, shorter, 0, height - 1),
        shorter,
        shorter,
    )
}
