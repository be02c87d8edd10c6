//! Geometry and color helpers shared by the comparison engine.
//!
//! Page space uses a top-left origin with y growing downward, which is the
//! convention of rendered rasters. Conversion to PDF user space happens only
//! inside the PDF writer.

/// A rectangle defined by (x0, y0, x1, y1) where (x0, y0) is the top-left
/// corner and (x1, y1) the bottom-right corner.
pub type Rect = (f64, f64, f64, f64);

/// An RGB color with components in the 0.0..=1.0 range.
pub type Color = (f64, f64, f64);

/// An 8-bit RGB color, used for raster tints.
pub type Rgb8 = [u8; 3];

pub const GREEN: Color = (0.0, 0.8, 0.0);
pub const RED: Color = (0.8, 0.0, 0.0);
pub const BLACK: Color = (0.0, 0.0, 0.0);

/// Small epsilon for floating-point comparisons.
pub const EPSILON: f64 = 1e-9;

/// Compares two floats for approximate equality.
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Width of a rectangle.
#[inline]
pub fn rect_width(rect: Rect) -> f64 {
    rect.2 - rect.0
}

/// Height of a rectangle.
#[inline]
pub fn rect_height(rect: Rect) -> f64 {
    rect.3 - rect.1
}

/// Returns true if any coordinate of the rectangle is NaN or infinite.
#[inline]
pub fn rect_is_infinite(rect: Rect) -> bool {
    let (x0, y0, x1, y1) = rect;
    !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite())
}

/// Returns true if the rectangle encloses no area.
#[inline]
pub fn rect_is_empty(rect: Rect) -> bool {
    let (x0, y0, x1, y1) = rect;
    x0 >= x1 || y0 >= y1
}

/// Returns true if the rectangle can be drawn: finite and non-empty.
#[inline]
pub fn rect_is_drawable(rect: Rect) -> bool {
    !rect_is_infinite(rect) && !rect_is_empty(rect)
}

/// Fits a `content_w` x `content_h` box into `rect`, preserving the aspect
/// ratio and centering the result.
pub fn fit_rect(rect: Rect, content_w: f64, content_h: f64) -> Rect {
    let (x0, y0, _, _) = rect;
    let (w, h) = (rect_width(rect), rect_height(rect));
    if content_w <= 0.0 || content_h <= 0.0 || w <= 0.0 || h <= 0.0 {
        return rect;
    }

    let scale = (w / content_w).min(h / content_h);
    let fitted_w = content_w * scale;
    let fitted_h = content_h * scale;
    let left = x0 + (w - fitted_w) / 2.0;
    let top = y0 + (h - fitted_h) / 2.0;
    (left, top, left + fitted_w, top + fitted_h)
}
