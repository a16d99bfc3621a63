use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect as DrawRect;

use super::face_detection::TrimResult;
use crate::trimming::Rect;

const FACE_BOX_THICKNESS: i32 = 2;
const CROP_BOX_THICKNESS: i32 = 4;
const CROP_BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Blue shaded by normalized detector weight, black for the weakest face
pub fn face_box_color(weight: f64) -> Rgb<u8> {
    Rgb([0, 0, (255.0 * weight.clamp(0.0, 1.0)).round() as u8])
}

/// Draw every detected face and the chosen crop on a copy of `img`
pub fn draw_detections(img: &RgbImage, result: &TrimResult) -> RgbImage {
    let mut annotated = img.clone();

    for face in &result.faces {
        draw_thick_rect(
            &mut annotated,
            face.rect,
            FACE_BOX_THICKNESS,
            face_box_color(face.weight),
        );
    }

    draw_thick_rect(&mut annotated, result.region, CROP_BOX_THICKNESS, CROP_BOX_COLOR);

    annotated
}

/// Hollow rectangle grown inward `thickness` pixels; degenerate boxes are skipped
fn draw_thick_rect(img: &mut RgbImage, rect: Rect, thickness: i32, color: Rgb<u8>) {
    for inset in 0..thickness {
        let width = rect.width - 2 * inset;
        let height = rect.height - 2 * inset;
        if width <= 0 || height <= 0 {
            break;
        }

        let outline = DrawRect::at(rect.x + inset, rect.y + inset).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(img, outline, color);
    }
}
