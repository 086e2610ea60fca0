//! Report-writer boundary and the bundled Markdown implementation.
//!
//! The engine only depends on the [`ReportWriter`] trait; spreadsheet or
//! other layouts plug in behind it.

use crate::aggregate::{ModelResultSet, RunStatistics};
use crate::{BatchError, Result, TaskResult};
use chrono::Utc;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for incremental and final report artifacts.
pub trait ReportWriter: Send + Sync {
    /// Write (or overwrite) one model's report.
    fn write_model_report(&self, model: &str, results: &[TaskResult]) -> Result<PathBuf>;

    /// Write the cross-model summary report.
    fn write_summary_report(&self, sets: &[ModelResultSet]) -> Result<PathBuf>;

    /// Write the statistics artifact.
    fn write_statistics(&self, stats: &RunStatistics) -> Result<PathBuf>;
}

/// Writes Markdown reports plus a JSON statistics file into one directory.
pub struct MarkdownReportWriter {
    output_dir: PathBuf,
    /// File-name timestamp, fixed at construction so autosave overwrites the
    /// same per-model file instead of scattering one file per flush.
    stamp: String,
}

impl MarkdownReportWriter {
    /// Create a writer targeting `output_dir` (created on first write).
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            stamp: Utc::now().format("%Y%m%d_%H%M%S").to_string(),
        }
    }

    /// The directory reports are written into.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| {
            BatchError::Report(format!(
                "failed to create {}: {}",
                self.output_dir.display(),
                e
            ))
        })?;

        let path = self.output_dir.join(name);
        fs::write(&path, contents)
            .map_err(|e| BatchError::Report(format!("failed to write {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Wrote report file");
        Ok(path)
    }

    fn render_results(buf: &mut String, results: &[TaskResult]) {
        for result in results {
            let _ = writeln!(buf, "## Question {}\n", result.question_id);
            let _ = writeln!(buf, "**Question**: {}\n", result.question);
            match &result.error {
                None => {
                    let _ = writeln!(buf, "**Answer**: {}\n", result.answer);
                }
                Some(error) => {
                    let _ = writeln!(buf, "**Status**: failed");
                    let _ = writeln!(buf, "**Error**: {}\n", error);
                }
            }
            let _ = writeln!(buf, "---\n");
        }
    }
}

/// Make a model name safe for use in a file name.
fn safe_file_name(model: &str) -> String {
    model.replace(['/', '\\', ':'], "_")
}

impl ReportWriter for MarkdownReportWriter {
    fn write_model_report(&self, model: &str, results: &[TaskResult]) -> Result<PathBuf> {
        let successes = results.iter().filter(|r| !r.is_error()).count();
        let failures = results.len() - successes;

        let mut buf = String::new();
        let _ = writeln!(buf, "# AIQA Monitor - {} report\n", model);
        let _ = writeln!(
            buf,
            "**Generated**: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(buf, "**Model**: {}\n", model);
        let _ = writeln!(buf, "## Statistics\n");
        let _ = writeln!(buf, "- **Succeeded**: {}/{}", successes, results.len());
        let _ = writeln!(buf, "- **Failed**: {}\n", failures);
        Self::render_results(&mut buf, results);

        let name = format!("AIQA_{}_{}.md", safe_file_name(model), self.stamp);
        self.write_file(&name, &buf)
    }

    fn write_summary_report(&self, sets: &[ModelResultSet]) -> Result<PathBuf> {
        let mut buf = String::new();
        let _ = writeln!(buf, "# AIQA Monitor - summary report\n");
        let _ = writeln!(
            buf,
            "**Generated**: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S")
        );
        let _ = writeln!(buf, "**Models**: {}\n", sets.len());

        for set in sets {
            let _ = writeln!(buf, "# Model: {}\n", set.model);
            let _ = writeln!(
                buf,
                "- **Succeeded**: {}/{}",
                set.success_count(),
                set.len()
            );
            let _ = writeln!(buf, "- **Failed**: {}\n", set.failure_count());
            Self::render_results(&mut buf, &set.results);
        }

        let name = format!("AIQA_SUMMARY_{}.md", self.stamp);
        self.write_file(&name, &buf)
    }

    fn write_statistics(&self, stats: &RunStatistics) -> Result<PathBuf> {
        let contents = serde_json::to_string_pretty(stats)?;
        let name = format!("AIQA_STATS_{}.json", self.stamp);
        self.write_file(&name, &contents)
    }
}
