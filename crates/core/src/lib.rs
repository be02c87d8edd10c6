//! vellum - page-by-page comparison of document revisions.
//!
//! Two revisions of a document are compared page by page. Pages that differ
//! are written to an annotated output document: the pixel-level differences
//! as a tinted overlay, and every added or removed word as a colored label
//! near its original position.
//!
//! # Example
//! ```ignore
//! use vellum_core::batch::{BatchOptions, BatchRunner};
//! use vellum_core::document::{BundleLoader, BundleRenderer};
//!
//! let options = BatchOptions::new("Old_Documents", "New_Documents", "Output");
//! let report = BatchRunner::new(BundleLoader, BundleRenderer, options)?.run()?;
//! println!("{} documents differ", report.with_differences());
//! ```

pub mod batch;
pub mod compare;
pub mod document;
pub mod error;
pub mod font;
pub mod output;
pub mod overlay;
pub mod placement;
pub mod raster;
pub mod text;
pub mod utils;

pub use batch::{BatchOptions, BatchReport, BatchRunner, PairOutcome, PairStatus};
pub use compare::{CompareOptions, ComparisonResult, DocumentComparer, PageComparer};
pub use error::{Result, VellumError};
pub use output::{DiffDocument, OutputDocument, OutputPage, PdfWriter};
pub use placement::{LabelCommand, LabelKind, LabelPlacer, PlacementState};
pub use text::{ChangeType, Word, WordDiff};
