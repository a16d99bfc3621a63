use anyhow::Result;
use image::{imageops, RgbImage};

use crate::trimming::{Rect, TrimError};

/// Cut `region` out of `img`.
///
/// Regions reaching outside the image are rejected rather than padded.
pub fn crop_image(img: &RgbImage, region: Rect) -> Result<RgbImage> {
    let (img_width, img_height) = img.dimensions();

    if region.width <= 0 || region.height <= 0 || !region.is_within(img_width as i32, img_height as i32)
    {
        return Err(TrimError::CropOutOfBounds {
            region,
            width: img_width,
            height: img_height,
        }
        .into());
    }

    let cropped = imageops::crop_imm(
        img,
        region.x as u32,
        region.y as u32,
        region.width as u32,
        region.height as u32,
    )
    .to_image();

    Ok(cropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn create_test_image(width: u32, height: u32) -> RgbImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn test_crop_image() {
        let img = create_test_image(100, 100);
        let cropped = crop_image(&img, Rect::new(10, 10, 50, 50)).unwrap();

        assert_eq!(cropped.dimensions(), (50, 50));

        let original_pixel = img.get_pixel(15, 15);
        let cropped_pixel = cropped.get_pixel(5, 5);
        assert_eq!(original_pixel, cropped_pixel);
    }

    #[test]
    fn test_crop_bounds_validation() {
        let img = create_test_image(50, 50);

        assert!(crop_image(&img, Rect::new(10, 10, 50, 50)).is_err());
        assert!(crop_image(&img, Rect::new(-1, 0, 10, 10)).is_err());
        assert!(crop_image(&img, Rect::new(0, 0, 0, 10)).is_err());
        assert!(crop_image(&img, Rect::new(10, 10, 40, 40)).is_ok());
    }

    #[test]
    fn test_crop_error_names_region() {
        let img = create_test_image(50, 50);
        let err = crop_image(&img, Rect::new(40, 0, 20, 20)).unwrap_err();

        let trim_err = err.downcast_ref::<TrimError>().unwrap();
        assert!(matches!(trim_err, TrimError::CropOutOfBounds { width: 50, height: 50, .. }));
    }
}
