//! Font measurement for label layout.

pub mod metrics;

pub use metrics::{Helvetica, encode_winansi};

/// Measures the advance width of a string set in a given font size.
///
/// This is the measurement capability of an output document, split out so
/// label placement can run before any output sink exists.
pub trait TextMeasure: Sync {
    /// Returns the width of `text` at `font_size`, in page units.
    fn measure_text_width(&self, text: &str, font_size: f64) -> f64;
}

impl<M: TextMeasure + ?Sized> TextMeasure for &M {
    fn measure_text_width(&self, text: &str, font_size: f64) -> f64 {
        (**self).measure_text_width(text, font_size)
    }
}
