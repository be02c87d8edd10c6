//! Page bundles: pre-rasterized pages with positioned words.
//!
//! A bundle is a JSON manifest:
//!
//! ```json
//! { "pages": [ { "width": 612.0, "height": 792.0, "image": "p1.png",
//!                "words": [ { "text": "Hello", "bbox": [72.0, 90.0, 98.0, 102.0] } ] } ] }
//! ```
//!
//! `image` is optional and resolved relative to the manifest's directory. A
//! page without an image renders as blank paper.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{DocumentLoader, Renderer, SourceDocument, SourcePage};
use crate::error::{Result, VellumError};
use crate::raster::{self, RasterImage};
use crate::text::Word;

#[derive(Debug, Deserialize)]
struct Manifest {
    pages: Vec<PageEntry>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    width: f64,
    height: f64,
    #[serde(default)]
    image: Option<PathBuf>,
    #[serde(default)]
    words: Vec<Word>,
}

/// One page of a bundle. Dimensions are in unscaled page units.
#[derive(Debug, Clone, PartialEq)]
pub struct BundlePage {
    pub width: f64,
    pub height: f64,
    pub image: Option<PathBuf>,
    pub words: Vec<Word>,
}

impl BundlePage {
    /// A page with no stored raster.
    pub fn blank(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            image: None,
            words: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: impl Into<PathBuf>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_words(mut self, words: Vec<Word>) -> Self {
        self.words = words;
        self
    }
}

impl SourcePage for BundlePage {
    fn words(&self) -> Result<Vec<Word>> {
        Ok(self.words.clone())
    }
}

/// An opened page bundle.
#[derive(Debug, Clone)]
pub struct BundleDocument {
    name: String,
    pages: Vec<BundlePage>,
}

impl BundleDocument {
    /// Reads and validates the manifest at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&data, base, &path.display().to_string())
    }

    /// Parses a manifest, resolving image paths against `base_dir`.
    pub fn from_json(json: &str, base_dir: &Path, name: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)?;
        let mut pages = Vec::with_capacity(manifest.pages.len());
        for (index, entry) in manifest.pages.into_iter().enumerate() {
            let valid = |v: f64| v.is_finite() && v > 0.0;
            if !valid(entry.width)
                || !valid(entry.height)
                || raster::scaled_size(entry.width, entry.height, 1.0, 1.0).is_err()
            {
                return Err(VellumError::InvalidDocument {
                    path: name.to_string(),
                    msg: format!(
                        "page {} has invalid size {}x{}",
                        index + 1,
                        entry.width,
                        entry.height
                    ),
                });
            }
            pages.push(BundlePage {
                width: entry.width,
                height: entry.height,
                image: entry.image.map(|p| base_dir.join(p)),
                words: entry.words,
            });
        }
        Ok(Self {
            name: name.to_string(),
            pages,
        })
    }

    /// Builds a bundle from in-memory pages.
    pub fn from_pages(name: impl Into<String>, pages: Vec<BundlePage>) -> Self {
        Self {
            name: name.into(),
            pages,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SourceDocument for BundleDocument {
    type Page = BundlePage;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_page(&self, index: usize) -> Result<BundlePage> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(VellumError::PageOutOfRange {
                index,
                count: self.pages.len(),
            })
    }
}

/// Renders bundle pages by resampling their stored raster.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleRenderer;

impl Renderer for BundleRenderer {
    type Page = BundlePage;

    fn render(&self, page: &BundlePage, scale_x: f64, scale_y: f64) -> Result<RasterImage> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(scale_x) || !valid(scale_y) {
            return Err(VellumError::Render(format!(
                "invalid scale {}x{}",
                scale_x, scale_y
            )));
        }

        let (width, height) = raster::scaled_size(page.width, page.height, scale_x, scale_y)?;
        match &page.image {
            Some(path) => {
                let stored = image::open(path)?.to_rgb8();
                Ok(raster::resample(stored, width, height))
            }
            None => Ok(raster::blank(width, height)),
        }
    }
}

/// Loads `.json` page bundles.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleLoader;

impl DocumentLoader for BundleLoader {
    type Document = BundleDocument;

    fn extension(&self) -> &str {
        "json"
    }

    fn open(&self, path: &Path) -> Result<BundleDocument> {
        BundleDocument::open(path)
    }
}
