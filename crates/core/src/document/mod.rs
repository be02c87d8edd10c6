//! Input documents and the collaborators that read them.
//!
//! A comparison needs three things from an input backend: how many pages a
//! document has, each page's positioned words, and a raster of each page at a
//! requested scale. Backends implement [`SourceDocument`] / [`SourcePage`] for
//! the first two and [`Renderer`] for rasterization; [`DocumentLoader`] opens
//! documents from disk for the batch runner.

pub mod bundle;

use std::path::Path;

use crate::error::Result;
use crate::raster::RasterImage;
use crate::text::Word;

pub use bundle::{BundleDocument, BundleLoader, BundlePage, BundleRenderer};

/// A single page of an input document.
pub trait SourcePage: Send {
    /// Positioned words on the page, in reading order, in unscaled page space.
    fn words(&self) -> Result<Vec<Word>>;
}

/// An opened input document.
pub trait SourceDocument: Sync {
    type Page: SourcePage;

    fn page_count(&self) -> usize;

    /// Loads page `index` (zero-based).
    fn load_page(&self, index: usize) -> Result<Self::Page>;
}

/// Rasterizes pages of one backend.
pub trait Renderer: Sync {
    type Page;

    /// Renders `page` scaled by `scale_x` horizontally and `scale_y` vertically.
    fn render(&self, page: &Self::Page, scale_x: f64, scale_y: f64) -> Result<RasterImage>;
}

/// Opens documents of one backend from the filesystem.
pub trait DocumentLoader: Sync {
    type Document: SourceDocument;

    /// File extension (without the dot) of documents this loader opens.
    fn extension(&self) -> &str;

    fn open(&self, path: &Path) -> Result<Self::Document>;
}
