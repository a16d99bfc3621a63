use super::numeric::clamp;
use super::{Point, Rect};

/// Score of one candidate window
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coverage {
    /// Sum over faces of the retained fraction of each face, so a fully kept
    /// face counts 1.0 regardless of its pixel size
    pub score: f64,
    /// Mean center of the retained parts of the faces, `(0, 0)` when none
    pub centroid: Point,
}

#[derive(Default)]
struct Accumulator {
    score: f64,
    center_sum: (i64, i64),
    contributing: i64,
}

/// Scores `candidate` against every face rectangle.
///
/// Faces with zero area are skipped. Centroid components use truncating
/// integer division.
pub fn evaluate(faces: &[Rect], candidate: Rect) -> Coverage {
    let acc = faces
        .iter()
        .fold(Accumulator::default(), |mut acc, face| {
            let original_area = face.area();
            if original_area == 0 {
                return acc;
            }

            let clipped = clip_to(face, &candidate);
            let clipped_area = clipped.area();

            acc.score += clipped_area as f64 / original_area as f64;

            if clipped_area > 0 {
                acc.center_sum.0 += (clipped.left() as i64 + clipped.right() as i64) / 2;
                acc.center_sum.1 += (clipped.top() as i64 + clipped.bottom() as i64) / 2;
                acc.contributing += 1;
            }
            acc
        });

    let centroid = if acc.contributing > 0 {
        Point::new(
            (acc.center_sum.0 / acc.contributing) as i32,
            (acc.center_sum.1 / acc.contributing) as i32,
        )
    } else {
        Point::default()
    };

    Coverage {
        score: acc.score,
        centroid,
    }
}

/// Clamps each edge of `face` independently into `region`
fn clip_to(face: &Rect, region: &Rect) -> Rect {
    let left = clamp(face.left(), region.left(), region.right());
    let right = clamp(face.right(), region.left(), region.right());
    let top = clamp(face.top(), region.top(), region.bottom());
    let bottom = clamp(face.bottom(), region.top(), region.bottom());

    Rect::new(left, top, right - left, bottom - top)
}
