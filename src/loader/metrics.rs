//! Load run metrics.
//!
//! Every call to [`SitemapLoader::load`](crate::SitemapLoader::load) produces
//! one [`LoadMetrics`] with a [`SourceMetrics`] entry per configured source,
//! in declaration order. The numbers are cheap to collect and always on:
//!
//! - wall-clock timestamps for the run (`chrono::Local`),
//! - elapsed durations for the run and for each source (`Instant`),
//! - line and page counts taken from the parsed sources.
//!
//! With `parallel` enabled the per-source durations overlap, so their sum can
//! exceed `total`.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::Duration;

// --- Metrics -----------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LoadMetrics {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    /// Elapsed time for the whole run, parse and merge.
    pub total: Duration,
    pub sources: Vec<SourceMetrics>,
}

impl Default for LoadMetrics {
    fn default() -> Self {
        let now = Local::now();
        LoadMetrics { started_at: now, finished_at: now, total: Duration::ZERO, sources: Vec::new() }
    }
}

impl LoadMetrics {
    pub fn comment_lines(&self) -> usize {
        self.sources.iter().map(|s| s.comment_lines).sum()
    }

    pub fn blank_lines(&self) -> usize {
        self.sources.iter().map(|s| s.blank_lines).sum()
    }

    pub fn pages_defined(&self) -> usize {
        self.sources.iter().map(|s| s.pages_defined).sum()
    }

    /// Sources that contributed nothing because they were unreadable or incomplete.
    pub fn aborted(&self) -> impl Iterator<Item = &SourceMetrics> {
        self.sources.iter().filter(|s| s.aborted)
    }
}

/// Counts for one source.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SourceMetrics {
    pub name: String,
    /// Time spent reading and parsing the source (not merging it).
    pub duration: Duration,
    pub comment_lines: usize,
    pub blank_lines: usize,
    /// Map lines accepted, before ancestors are synthesized.
    pub pages_defined: usize,
    pub redirects: usize,
    pub missing_label_keys: usize,
    pub aborted: bool,
}
