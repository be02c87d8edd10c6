//! Page and document comparison.
//!
//! [`PageComparer`] decides whether one page pair differs and builds the
//! annotated page; [`DocumentComparer`] runs it over every page pair of two
//! documents and collects the pages that differ.

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::document::{Renderer, SourceDocument, SourcePage};
use crate::error::{Result, VellumError};
use crate::font::{Helvetica, TextMeasure};
use crate::output::{DiffDocument, OutputPage};
use crate::overlay::{Overlay, TintOverlay};
use crate::placement::LabelPlacer;
use crate::raster;
use crate::text::{TextDiffer, WordDiffer};
use crate::utils::Rgb8;

/// Tint applied to visually changed pixels.
pub const DEFAULT_TINT: Rgb8 = [170, 51, 106];

/// Options controlling a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Zoom factor applied to rendering and label geometry.
    pub quality: f64,

    /// Label font size before scaling by `quality`.
    pub font_size: f64,

    /// Overlay tint for changed pixels.
    pub tint: Rgb8,

    /// Overlay tint opacity, 0.0 to 1.0.
    pub opacity: f64,

    /// Number of threads used to compare the pages of one document pair.
    /// 1 compares pages sequentially on the calling thread.
    pub page_threads: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            quality: 2.0,
            font_size: 8.0,
            tint: DEFAULT_TINT,
            opacity: 0.5,
            page_threads: 1,
        }
    }
}

impl CompareOptions {
    /// Creates validated options.
    pub fn new(
        quality: f64,
        font_size: f64,
        tint: Rgb8,
        opacity: f64,
        page_threads: usize,
    ) -> Result<Self> {
        let options = Self {
            quality,
            font_size,
            tint,
            opacity,
            page_threads,
        };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.quality.is_finite() && self.quality > 0.0) {
            return Err(VellumError::InvalidOptions(format!(
                "quality must be a positive number, got {}",
                self.quality
            )));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(VellumError::InvalidOptions(format!(
                "font size must be a positive number, got {}",
                self.font_size
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(VellumError::InvalidOptions(format!(
                "opacity must be between 0.0 and 1.0, got {}",
                self.opacity
            )));
        }
        if self.page_threads == 0 {
            return Err(VellumError::InvalidOptions(
                "page_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Compares single page pairs.
pub struct PageComparer<R, O = TintOverlay, D = WordDiffer, M = Helvetica> {
    renderer: R,
    overlay: O,
    differ: D,
    measure: M,
    options: CompareOptions,
}

impl<R: Renderer> PageComparer<R>
where
    R::Page: SourcePage,
{
    /// Uses the built-in overlay, word differ and Helvetica metrics.
    pub fn new(renderer: R, options: CompareOptions) -> Self {
        Self::with_collaborators(renderer, TintOverlay::default(), WordDiffer, Helvetica, options)
    }
}

impl<R, O, D, M> PageComparer<R, O, D, M>
where
    R: Renderer,
    R::Page: SourcePage,
    O: Overlay,
    D: TextDiffer,
    M: TextMeasure,
{
    pub fn with_collaborators(
        renderer: R,
        overlay: O,
        differ: D,
        measure: M,
        options: CompareOptions,
    ) -> Self {
        Self {
            renderer,
            overlay,
            differ,
            measure,
            options,
        }
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Compares one page pair, returning the annotated page if it differs.
    ///
    /// Render failures are returned as errors. If either page's words cannot
    /// be extracted, the pair is compared on pixels alone.
    pub fn compare_page(
        &self,
        index: usize,
        old: &R::Page,
        new: &R::Page,
    ) -> Result<Option<OutputPage>> {
        let quality = self.options.quality;

        // Renders live only until the composite exists.
        let (width, height, composite) = {
            let old_image = self.renderer.render(old, quality, quality)?;
            let (width, height) = old_image.dimensions();
            let new_image = raster::resample(
                self.renderer.render(new, quality, quality)?,
                width,
                height,
            );
            let composite = self.overlay.combine(
                &old_image,
                &new_image,
                self.options.tint,
                self.options.opacity,
            );
            (width, height, composite)
        };

        // Word diffs need both sides.
        let diffs = match (old.words(), new.words()) {
            (Ok(old_words), Ok(new_words)) => self.differ.diff(&old_words, &new_words),
            (Err(e), _) | (_, Err(e)) => {
                warn!(
                    page = index + 1,
                    error = %e,
                    "text extraction failed; comparing pixels only"
                );
                Vec::new()
            }
        };

        if composite.is_none() && diffs.is_empty() {
            debug!(page = index + 1, "page unchanged");
            return Ok(None);
        }

        let image = composite.and_then(|img| match raster::encode_png(&img) {
            Ok(png) => Some(png),
            Err(e) => {
                warn!(page = index + 1, error = %e, "dropping overlay image");
                None
            }
        });

        let placer = LabelPlacer::new(&self.measure, self.options.font_size, quality);
        let labels = placer.place(&diffs);
        debug!(
            page = index + 1,
            overlay = image.is_some(),
            words = diffs.len(),
            labels = labels.len(),
            "page differs"
        );

        Ok(Some(OutputPage {
            index,
            width,
            height,
            image,
            labels,
        }))
    }
}

/// Outcome of comparing two documents.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// Number of page pairs compared.
    pub pages_compared: usize,

    /// Annotated pages, present only when at least one page differs.
    pub document: Option<DiffDocument>,
}

impl ComparisonResult {
    pub fn differences_found(&self) -> bool {
        self.document.is_some()
    }
}

/// Compares whole documents page by page.
pub struct DocumentComparer<R, O = TintOverlay, D = WordDiffer, M = Helvetica> {
    pages: PageComparer<R, O, D, M>,
}

impl<R: Renderer> DocumentComparer<R>
where
    R::Page: SourcePage,
{
    pub fn new(renderer: R, options: CompareOptions) -> Self {
        Self::from_page_comparer(PageComparer::new(renderer, options))
    }
}

impl<R, O, D, M> DocumentComparer<R, O, D, M>
where
    R: Renderer,
    R::Page: SourcePage,
    O: Overlay,
    D: TextDiffer,
    M: TextMeasure,
{
    pub fn from_page_comparer(pages: PageComparer<R, O, D, M>) -> Self {
        Self { pages }
    }

    pub fn page_comparer(&self) -> &PageComparer<R, O, D, M> {
        &self.pages
    }

    /// Compares the first `min(old, new)` pages of two documents.
    ///
    /// Pages beyond the shorter document are not compared.
    pub fn compare_documents<Doc>(&self, old: &Doc, new: &Doc) -> Result<ComparisonResult>
    where
        Doc: SourceDocument<Page = R::Page>,
    {
        let (old_count, new_count) = (old.page_count(), new.page_count());
        let count = old_count.min(new_count);
        if old_count != new_count {
            debug!(old_count, new_count, "page counts differ; comparing first {count}");
        }

        let threads = self.pages.options().page_threads;
        let pages = if threads > 1 && count > 1 {
            self.compare_parallel(old, new, count, threads)?
        } else {
            self.compare_sequential(old, new, count)?
        };

        let document = (!pages.is_empty()).then_some(DiffDocument { pages });
        Ok(ComparisonResult {
            pages_compared: count,
            document,
        })
    }

    fn compare_sequential<Doc>(
        &self,
        old: &Doc,
        new: &Doc,
        count: usize,
    ) -> Result<Vec<OutputPage>>
    where
        Doc: SourceDocument<Page = R::Page>,
    {
        let mut pages = Vec::new();
        for index in 0..count {
            let old_page = old.load_page(index)?;
            let new_page = new.load_page(index)?;
            if let Some(page) = self.pages.compare_page(index, &old_page, &new_page)? {
                pages.push(page);
            }
        }
        Ok(pages)
    }

    fn compare_parallel<Doc>(
        &self,
        old: &Doc,
        new: &Doc,
        count: usize,
        threads: usize,
    ) -> Result<Vec<OutputPage>>
    where
        Doc: SourceDocument<Page = R::Page>,
    {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| VellumError::ThreadPool(e.to_string()))?;

        let mut pairs = Vec::with_capacity(count);
        for index in 0..count {
            pairs.push((index, old.load_page(index)?, new.load_page(index)?));
        }

        let mut results: Vec<(usize, Result<Option<OutputPage>>)> = pool.install(|| {
            pairs
                .into_par_iter()
                .map(|(index, old_page, new_page)| {
                    (index, self.pages.compare_page(index, &old_page, &new_page))
                })
                .collect()
        });

        results.sort_by_key(|(index, _)| *index);
        let mut pages = Vec::new();
        for (_, result) in results {
            if let Some(page) = result? {
                pages.push(page);
            }
        }
        Ok(pages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        let options = CompareOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.quality, 2.0);
        assert_eq!(options.font_size, 8.0);
        assert_eq!(options.tint, [170, 51, 106]);
        assert_eq!(options.opacity, 0.5);
    }

    #[test]
    fn test_invalid_options_rejected() {
        assert!(CompareOptions::new(0.0, 8.0, DEFAULT_TINT, 0.5, 1).is_err());
        assert!(CompareOptions::new(f64::NAN, 8.0, DEFAULT_TINT, 0.5, 1).is_err());
        assert!(CompareOptions::new(2.0, -1.0, DEFAULT_TINT, 0.5, 1).is_err());
        assert!(CompareOptions::new(2.0, 8.0, DEFAULT_TINT, 1.5, 1).is_err());
        assert!(CompareOptions::new(2.0, 8.0, DEFAULT_TINT, 0.5, 0).is_err());
        assert!(CompareOptions::new(1.0, 10.0, [0, 0, 0], 1.0, 4).is_ok());
    }
}
