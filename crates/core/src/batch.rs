//! Batch comparison of two directories of document revisions.
//!
//! Documents are matched by file name. Each pair is compared independently:
//! a pair that fails to open or render is reported as failed and the batch
//! moves on.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use itertools::Itertools;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{info, warn};

use crate::compare::{CompareOptions, DocumentComparer};
use crate::document::{DocumentLoader, Renderer, SourceDocument, SourcePage};
use crate::error::{Result, VellumError};
use crate::font::{Helvetica, TextMeasure};
use crate::overlay::{Overlay, TintOverlay};
use crate::text::{TextDiffer, WordDiffer};

/// Prefix of every output file name.
pub const OUTPUT_PREFIX: &str = "diff_";

/// Options for a batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub old_dir: PathBuf,
    pub new_dir: PathBuf,
    pub output_dir: PathBuf,

    /// Number of document pairs compared concurrently.
    pub jobs: usize,

    /// Remove everything in `output_dir` before the run.
    pub clear_output: bool,

    pub compare: CompareOptions,
}

impl BatchOptions {
    pub fn new(
        old_dir: impl Into<PathBuf>,
        new_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            old_dir: old_dir.into(),
            new_dir: new_dir.into(),
            output_dir: output_dir.into(),
            jobs: 1,
            clear_output: true,
            compare: CompareOptions::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.jobs == 0 {
            return Err(VellumError::InvalidOptions(
                "jobs must be at least 1".to_string(),
            ));
        }
        self.compare.validate()
    }
}

/// What happened to one document pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairStatus {
    /// At least one page differs; the annotated document was written.
    Differences { output: PathBuf, pages: usize },
    NoDifferences,
    /// No new-side document with the same name.
    MissingCounterpart,
    Failed { reason: String },
}

/// Result of one document pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairOutcome {
    pub name: String,
    #[serde(flatten)]
    pub status: PairStatus,
    pub pages_compared: usize,
    pub elapsed_secs: f64,
}

/// Results of a batch run, in old-side file name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub pairs: Vec<PairOutcome>,
    pub total_secs: f64,
}

impl BatchReport {
    pub fn with_differences(&self) -> usize {
        self.count(|s| matches!(s, PairStatus::Differences { .. }))
    }

    pub fn failures(&self) -> usize {
        self.count(|s| matches!(s, PairStatus::Failed { .. }))
    }

    pub fn missing(&self) -> usize {
        self.count(|s| matches!(s, PairStatus::MissingCounterpart))
    }

    fn count(&self, pred: impl Fn(&PairStatus) -> bool) -> usize {
        self.pairs.iter().filter(|p| pred(&p.status)).count()
    }
}

/// Output file for the document named `name`: `diff_<stem>.pdf`.
pub fn output_file_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    format!("{OUTPUT_PREFIX}{stem}.pdf")
}

/// Compares every document in `old_dir` with its namesake in `new_dir`.
pub struct BatchRunner<L, R, O = TintOverlay, D = WordDiffer, M = Helvetica> {
    loader: L,
    comparer: DocumentComparer<R, O, D, M>,
    options: BatchOptions,
}

impl<L, R> BatchRunner<L, R>
where
    L: DocumentLoader,
    R: Renderer<Page = <L::Document as SourceDocument>::Page>,
{
    pub fn new(loader: L, renderer: R, options: BatchOptions) -> Result<Self> {
        let comparer = DocumentComparer::new(renderer, options.compare.clone());
        Self::with_comparer(loader, comparer, options)
    }
}

impl<L, R, O, D, M> BatchRunner<L, R, O, D, M>
where
    L: DocumentLoader,
    R: Renderer<Page = <L::Document as SourceDocument>::Page>,
    R::Page: SourcePage,
    O: Overlay,
    D: TextDiffer,
    M: TextMeasure,
{
    /// Uses a preconfigured comparer. The comparer's own options take
    /// precedence over `options.compare`.
    pub fn with_comparer(
        loader: L,
        comparer: DocumentComparer<R, O, D, M>,
        options: BatchOptions,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            loader,
            comparer,
            options,
        })
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Runs the batch.
    ///
    /// Fails only if the input directories cannot be listed or the output
    /// directory cannot be created; per-pair problems end up in the report.
    pub fn run(&self) -> Result<BatchReport> {
        let started = Instant::now();
        self.prepare_output_dir()?;

        let old_files = self.list_documents(&self.options.old_dir)?;
        let new_files: FxHashSet<String> = self
            .list_documents(&self.options.new_dir)?
            .into_iter()
            .collect();

        if old_files.is_empty() {
            warn!(dir = %self.options.old_dir.display(), "no documents found in old directory");
        }
        if new_files.is_empty() {
            warn!(dir = %self.options.new_dir.display(), "no documents found in new directory");
        }

        let pairs: Vec<PairOutcome> = if self.options.jobs > 1 && old_files.len() > 1 {
            let pool = ThreadPoolBuilder::new()
                .num_threads(self.options.jobs)
                .build()
                .map_err(|e| VellumError::ThreadPool(e.to_string()))?;
            pool.install(|| {
                old_files
                    .par_iter()
                    .map(|name| self.run_pair(name, new_files.contains(name)))
                    .collect()
            })
        } else {
            old_files
                .iter()
                .map(|name| self.run_pair(name, new_files.contains(name)))
                .collect()
        };

        let report = BatchReport {
            pairs,
            total_secs: started.elapsed().as_secs_f64(),
        };
        info!(
            documents = report.pairs.len(),
            differences = report.with_differences(),
            failures = report.failures(),
            "total time taken for comparing all documents: {:.2}s",
            report.total_secs
        );
        Ok(report)
    }

    /// Path of the annotated output for the document named `name`.
    pub fn output_path_for(&self, name: &str) -> PathBuf {
        self.options.output_dir.join(output_file_name(name))
    }

    fn prepare_output_dir(&self) -> Result<()> {
        let dir = &self.options.output_dir;
        fs::create_dir_all(dir)?;
        if !self.options.clear_output {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "failed to read output entry");
                    continue;
                }
            };
            let path = entry.path();
            let removed = match entry.file_type() {
                Ok(ft) if ft.is_dir() => fs::remove_dir_all(&path),
                Ok(_) => fs::remove_file(&path),
                Err(e) => Err(e),
            };
            if let Err(e) = removed {
                warn!(path = %path.display(), error = %e, "failed to delete");
            }
        }
        Ok(())
    }

    fn list_documents(&self, dir: &Path) -> Result<Vec<String>> {
        let extension = self.loader.extension();
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let matches = path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
            if !matches {
                continue;
            }
            if let Some(name) = path.file_name() {
                names.push(name.to_string_lossy().into_owned());
            }
        }
        Ok(names.into_iter().sorted().collect())
    }

    fn run_pair(&self, name: &str, has_counterpart: bool) -> PairOutcome {
        let started = Instant::now();
        if !has_counterpart {
            warn!(file = name, "no counterpart in the new documents directory");
            return PairOutcome {
                name: name.to_string(),
                status: PairStatus::MissingCounterpart,
                pages_compared: 0,
                elapsed_secs: started.elapsed().as_secs_f64(),
            };
        }

        let (status, pages_compared) = match self.compare_pair(name) {
            Ok(done) => done,
            Err(e) => {
                warn!(file = name, error = %e, "comparison failed");
                (
                    PairStatus::Failed {
                        reason: e.to_string(),
                    },
                    0,
                )
            }
        };
        let elapsed_secs = started.elapsed().as_secs_f64();

        match &status {
            PairStatus::Differences { output, pages } => {
                info!(file = name, pages, "differences found: {}", output.display());
            }
            PairStatus::NoDifferences => info!(file = name, "no differences found"),
            _ => {}
        }
        info!(file = name, "time taken: {elapsed_secs:.2}s");

        PairOutcome {
            name: name.to_string(),
            status,
            pages_compared,
            elapsed_secs,
        }
    }

    fn compare_pair(&self, name: &str) -> Result<(PairStatus, usize)> {
        let old = self.loader.open(&self.options.old_dir.join(name))?;
        let new = self.loader.open(&self.options.new_dir.join(name))?;
        let result = self.comparer.compare_documents(&old, &new)?;
        drop((old, new));

        let status = match result.document {
            Some(document) => {
                let output = self.output_path_for(name);
                document.save_pdf(&output)?;
                PairStatus::Differences {
                    output,
                    pages: document.page_count(),
                }
            }
            None => PairStatus::NoDifferences,
        };
        Ok((status, result.pages_compared))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("report.json"), "diff_report.pdf");
        assert_eq!(output_file_name("a.b.pdf"), "diff_a.b.pdf");
        assert_eq!(output_file_name("plain"), "diff_plain.pdf");
    }

    #[test]
    fn test_batch_options_validation() {
        let mut options = BatchOptions::new("old", "new", "out");
        assert!(options.validate().is_ok());
        options.jobs = 0;
        assert!(options.validate().is_err());
        options.jobs = 2;
        options.compare.quality = -1.0;
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_report_counts() {
        let outcome = |status| PairOutcome {
            name: "x".to_string(),
            status,
            pages_compared: 0,
            elapsed_secs: 0.0,
        };
        let report = BatchReport {
            pairs: vec![
                outcome(PairStatus::NoDifferences),
                outcome(PairStatus::MissingCounterpart),
                outcome(PairStatus::Failed {
                    reason: "bad".to_string(),
                }),
                outcome(PairStatus::Differences {
                    output: PathBuf::from("diff_x.pdf"),
                    pages: 2,
                }),
            ],
            total_secs: 0.0,
        };
        assert_eq!(report.with_differences(), 1);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.missing(), 1);
    }

    #[test]
    fn test_report_serializes_status_tag() {
        let outcome = PairOutcome {
            name: "a.json".to_string(),
            status: PairStatus::Failed {
                reason: "corrupt".to_string(),
            },
            pages_compared: 0,
            elapsed_secs: 0.5,
        };
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["reason"], "corrupt");
        assert_eq!(value["name"], "a.json");
    }
}
