//! What is drawn on the root window behind everything

use std::path::Path;

use image::{imageops::FilterType, DynamicImage, GenericImageView, ImageError};

use crate::{bar::render::Canvas, color::Color, rect::Rect};

/// Paints the background of one monitor
pub(crate) trait BackgroundSource: std::fmt::Debug {
    fn fill(&self, canvas: &mut Canvas, area: Rect);
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct SolidFill(pub(crate) Color);

impl BackgroundSource for SolidFill {
    fn fill(&self, canvas: &mut Canvas, area: Rect) {
        canvas.fill_rect(area, self.0.with_alpha(255));
    }
}

/// An image scaled to cover every monitor
#[derive(Debug)]
pub(crate) struct ImageFill {
    image: DynamicImage,
}

impl ImageFill {
    pub(crate) fn open(path: &Path) -> Result<Self, ImageError> {
        let image = image::open(path)?;
        log::info!(
            "Loaded background {:?}, {}x{}",
            path,
            image.width(),
            image.height()
        );
        Ok(Self::from_image(image))
    }

    pub(crate) fn from_image(image: DynamicImage) -> Self {
        Self { image }
    }
}

impl BackgroundSource for ImageFill {
    fn fill(&self, canvas: &mut Canvas, area: Rect) {
        if area.width <= 0 || area.height <= 0 {
            return;
        }
        let cover = cover(&self.image, area.width as u32, area.height as u32);
        canvas.blit_rgba(area.x, area.y, cover.width(), cover.to_rgba8().as_raw());
    }
}

/// Scale `image` so it fills `width`x`height`, then crop the middle
fn cover(image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (img_width, img_height) = image.dimensions();
    let scale = (f64::from(width) / f64::from(img_width.max(1)))
        .max(f64::from(height) / f64::from(img_height.max(1)));

    // never smaller than the target, rounding could leave a line uncovered
    let scaled_width = ((f64::from(img_width) * scale).ceil() as u32).max(width);
    let scaled_height = ((f64::from(img_height) * scale).ceil() as u32).max(height);
    let resized = image.resize_exact(scaled_width, scaled_height, FilterType::CatmullRom);

    let crop_x = (scaled_width - width) / 2;
    let crop_y = (scaled_height - height) / 2;
    resized.crop_imm(crop_x, crop_y, width, height)
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    #[test]
    fn cover_keeps_the_middle() {
        // left half red, right half blue, twice as wide as the target ratio
        let image = RgbaImage::from_fn(40, 10, |x, _| {
            if x < 20 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let covered = cover(&DynamicImage::ImageRgba8(image), 10, 10);
        assert_eq!(covered.dimensions(), (10, 10));
        let left = covered.get_pixel(1, 5);
        let right = covered.get_pixel(8, 5);
        assert!(left[0] > 200 && left[2] < 50);
        assert!(right[2] > 200 && right[0] < 50);
    }

    #[test]
    fn image_lands_on_the_monitor() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let fill = ImageFill::from_image(DynamicImage::ImageRgba8(image));
        let mut canvas = Canvas::new(20, 10);
        fill.fill(&mut canvas, Rect::new(10, 0, 10, 10));
        let [b, g, r, a] = canvas.pixel(15, 5);
        let close = |v: u8, want: i32| (v as i32 - want).abs() <= 1;
        assert!(close(b, 30) && close(g, 20) && close(r, 10));
        assert_eq!(a, 255);
        assert_eq!(canvas.pixel(5, 5), [0, 0, 0, 0]);
    }

    #[test]
    fn solid() {
        let mut canvas = Canvas::new(4, 4);
        SolidFill(Color::rgb(1, 2, 3).with_alpha(10)).fill(&mut canvas, Rect::new(0, 0, 2, 4));
        assert_eq!(canvas.pixel(1, 1), [3, 2, 1, 255]);
        assert_eq!(canvas.pixel(3, 1), [0, 0, 0, 0]);
    }
}
