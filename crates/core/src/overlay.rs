//! Pixel-level difference overlay.

use image::Rgb;

use crate::raster::RasterImage;
use crate::utils::Rgb8;

/// Combines two same-size renders of a page pair into a tinted composite.
pub trait Overlay: Sync {
    /// Returns the composite, or `None` when the two images are visually
    /// identical. Callers guarantee `a` and `b` have the same dimensions.
    fn combine(
        &self,
        a: &RasterImage,
        b: &RasterImage,
        tint: Rgb8,
        opacity: f64,
    ) -> Option<RasterImage>;
}

/// Default overlay: unchanged pixels are copied from the new image, changed
/// pixels show the darker of both images blended with the tint.
#[derive(Debug, Clone, Copy, Default)]
pub struct TintOverlay {
    /// Per-channel difference at or below which pixels count as equal.
    pub threshold: u8,
}

impl TintOverlay {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    fn differs(&self, a: &Rgb<u8>, b: &Rgb<u8>) -> bool {
        a.0.iter()
            .zip(b.0.iter())
            .any(|(x, y)| x.abs_diff(*y) > self.threshold)
    }
}

fn blend(base: u8, tint: u8, opacity: f64) -> u8 {
    let v = f64::from(base) * (1.0 - opacity) + f64::from(tint) * opacity;
    v.round().clamp(0.0, 255.0) as u8
}

impl Overlay for TintOverlay {
    fn combine(
        &self,
        a: &RasterImage,
        b: &RasterImage,
        tint: Rgb8,
        opacity: f64,
    ) -> Option<RasterImage> {
        debug_assert_eq!(a.dimensions(), b.dimensions());
        let opacity = opacity.clamp(0.0, 1.0);

        let mut composite = b.clone();
        let mut changed = false;
        for (out, (pa, pb)) in composite
            .pixels_mut()
            .zip(a.pixels().zip(b.pixels()))
        {
            if !self.differs(pa, pb) {
                continue;
            }
            changed = true;
            for c in 0..3 {
                let base = pa.0[c].min(pb.0[c]);
                out.0[c] = blend(base, tint[c], opacity);
            }
        }

        changed.then_some(composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::blank;

    const TINT: Rgb8 = [170, 51, 106];

    #[test]
    fn test_identical_images_yield_none() {
        let a = blank(8, 8);
        let b = blank(8, 8);
        assert!(TintOverlay::default().combine(&a, &b, TINT, 0.5).is_none());
    }

    #[test]
    fn test_changed_pixel_is_tinted() {
        let a = blank(4, 4);
        let mut b = blank(4, 4);
        b.put_pixel(2, 1, Rgb([0, 0, 0]));

        let out = TintOverlay::default()
            .combine(&a, &b, TINT, 0.5)
            .expect("difference expected");
        assert_eq!(out.get_pixel(2, 1), &Rgb([85, 26, 53]));
        assert_eq!(out.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_threshold_ignores_small_noise() {
        let a = blank(2, 2);
        let mut b = blank(2, 2);
        b.put_pixel(0, 0, Rgb([250, 255, 255]));
        assert!(TintOverlay::new(8).combine(&a, &b, TINT, 0.5).is_none());
        assert!(TintOverlay::new(0).combine(&a, &b, TINT, 0.5).is_some());
    }

    #[test]
    fn test_full_opacity_paints_tint() {
        let a = blank(1, 1);
        let mut b = blank(1, 1);
        b.put_pixel(0, 0, Rgb([0, 0, 0]));
        let out = TintOverlay::default().combine(&a, &b, TINT, 1.0).unwrap();
        assert_eq!(out.get_pixel(0, 0), &Rgb(TINT));
    }
}
