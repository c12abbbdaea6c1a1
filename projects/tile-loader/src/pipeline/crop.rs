use crate::error::{Error, Result};
use crate::pipeline::types::MarginSpec;
use image::{DynamicImage, GenericImageView};

/// Pixel rectangle kept after discarding the margins, as `[left, right) x [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl CropRect {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// Each side is floored independently, so the kept width may differ by one
/// pixel from `W * (1 - left - right)`.
pub fn margin_rect(width: u32, height: u32, margins: &MarginSpec) -> Result<CropRect> {
    let w = f64::from(width);
    let h = f64::from(height);

    let left = (w * margins.left()).floor() as u32;
    let right = width.saturating_sub((w * margins.right()).floor() as u32);
    let top = (h * margins.top()).floor() as u32;
    let bottom = height.saturating_sub((h * margins.bottom()).floor() as u32);

    if right <= left || bottom <= top {
        return Err(Error::InvalidMargin {
            reason: format!(
                "crop [{}, {}) x [{}, {}) of a {}x{} image has no area",
                left, right, top, bottom, width, height
            ),
        });
    }

    Ok(CropRect {
        left,
        right,
        top,
        bottom,
    })
}

/// Crops the margins off an image. The input is left untouched.
pub fn crop_to_margin(image: &DynamicImage, margins: &MarginSpec) -> Result<DynamicImage> {
    let (width, height) = image.dimensions();
    let rect = margin_rect(width, height, margins)?;
    Ok(image.crop_imm(rect.left, rect.top, rect.width(), rect.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_crop_uniform_margin() {
        let image = DynamicImage::new_luma8(100, 100);
        let margins = MarginSpec::uniform(0.2).unwrap();
        let cropped = crop_to_margin(&image, &margins).unwrap();
        assert_eq!(cropped.dimensions(), (60, 60));
    }

    #[test]
    fn test_crop_without_margin_is_identity() {
        let image = DynamicImage::new_rgb8(37, 23);
        let cropped = crop_to_margin(&image, &MarginSpec::NONE).unwrap();
        assert_eq!(cropped.dimensions(), (37, 23));
    }

    #[test]
    fn test_crop_rounds_each_side_independently() {
        // 0.15 * 33 = 4.95 and 0.25 * 33 = 8.25 are floored separately
        let rect = margin_rect(33, 10, &MarginSpec::new(0.15, 0.25, 0.0, 0.0).unwrap()).unwrap();
        assert_eq!(rect.left, 4);
        assert_eq!(rect.right, 33 - 8);
        assert_eq!(rect.width(), 33 - 4 - 8);
        assert_eq!(rect.height(), 10);
    }

    #[test]
    fn test_crop_width_matches_formula() {
        let margins = MarginSpec::new(0.1, 0.3, 0.05, 0.45).unwrap();
        for (w, h) in [(1u32, 1u32), (7, 3), (64, 48), (101, 257), (1920, 1080)] {
            let rect = margin_rect(w, h, &margins).unwrap();
            let expected_w =
                w - (f64::from(w) * 0.1).floor() as u32 - (f64::from(w) * 0.3).floor() as u32;
            let expected_h =
                h - (f64::from(h) * 0.05).floor() as u32 - (f64::from(h) * 0.45).floor() as u32;
            assert_eq!(rect.width(), expected_w);
            assert_eq!(rect.height(), expected_h);
            assert!(rect.right <= w && rect.bottom <= h);
        }
    }

    #[test]
    fn test_crop_keeps_the_right_pixels() {
        let image = DynamicImage::ImageLuma8(GrayImage::from_fn(10, 10, |x, y| {
            Luma([(y * 10 + x) as u8])
        }));
        let margins = MarginSpec::new(0.2, 0.1, 0.3, 0.0).unwrap();
        let cropped = crop_to_margin(&image, &margins).unwrap();
        assert_eq!(cropped.dimensions(), (7, 7));
        // Top-left of the crop is source pixel (2, 3)
        assert_eq!(cropped.to_luma8().get_pixel(0, 0).0[0], 32);
        // Source image is unchanged
        assert_eq!(image.dimensions(), (10, 10));
    }

    #[test]
    fn test_crop_of_empty_image_is_rejected() {
        let image = DynamicImage::new_luma8(0, 10);
        let result = crop_to_margin(&image, &MarginSpec::NONE);
        assert!(matches!(result, Err(Error::InvalidMargin { .. })));
    }
}
