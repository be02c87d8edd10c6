//! Annotated output documents.

pub mod pdf;

use std::path::Path;

use crate::error::Result;
use crate::font::TextMeasure;
use crate::placement::LabelCommand;
use crate::utils::{Color, Rect};

pub use pdf::PdfWriter;

/// Handle to a page created by an [`OutputDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle(pub usize);

/// Sink that assembles the annotated document.
///
/// All rectangles are in page space: top-left origin, y growing downward.
pub trait OutputDocument: TextMeasure {
    fn new_page(&mut self, width: f64, height: f64) -> PageHandle;

    /// Places a PNG image inside `rect`, letterboxed when `keep_aspect_ratio`.
    fn insert_image(
        &mut self,
        page: PageHandle,
        rect: Rect,
        png: &[u8],
        keep_aspect_ratio: bool,
    ) -> Result<()>;

    fn insert_text_box(
        &mut self,
        page: PageHandle,
        rect: Rect,
        text: &str,
        font_size: f64,
        color: Color,
    ) -> Result<()>;

    fn page_count(&self) -> usize;

    fn save(&self, path: &Path) -> Result<()>;
}

/// One annotated page: the overlay composite (PNG) and its labels.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPage {
    /// Zero-based index of the page pair this page was built from.
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub image: Option<Vec<u8>>,
    pub labels: Vec<LabelCommand>,
}

impl OutputPage {
    /// Draws this page as a new page of `doc`.
    pub fn draw_onto<D: OutputDocument + ?Sized>(&self, doc: &mut D) -> Result<PageHandle> {
        let (width, height) = (f64::from(self.width), f64::from(self.height));
        let page = doc.new_page(width, height);
        if let Some(png) = &self.image {
            doc.insert_image(page, (0.0, 0.0, width, height), png, true)?;
        }
        for label in &self.labels {
            doc.insert_text_box(page, label.rect, &label.text, label.font_size, label.color)?;
        }
        Ok(page)
    }
}

/// The pages of a comparison that found differences, in page order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffDocument {
    pub pages: Vec<OutputPage>,
}

impl DiffDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Replays every page onto `doc`, in order.
    pub fn write_to<D: OutputDocument + ?Sized>(&self, doc: &mut D) -> Result<()> {
        for page in &self.pages {
            page.draw_onto(doc)?;
        }
        Ok(())
    }

    /// Writes the document as a PDF file.
    pub fn save_pdf(&self, path: &Path) -> Result<()> {
        let mut writer = PdfWriter::new();
        self.write_to(&mut writer)?;
        writer.save(path)
    }
}
