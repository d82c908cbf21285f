//! Master tree loader.
//!
//! The loader owns the list of configured sources and turns them into a
//! [`MasterTree`] published through a [`SharedMasterTree`]. A run has two
//! phases:
//!
//! ```text
//! phase 1: parse                 phase 2: merge (calling thread, in order)
//!
//! source a ── read ── parse ──┐
//! source b ── read ── parse ──┼──▶ append / add_redirect ──▶ publish
//! source c ── read ── parse ──┘    (incomplete sources skipped)
//! ```
//!
//! Parsing is a pure function of a source's lines, so phase 1 may run on
//! scoped threads when [`LoaderOptions::parallel`] is set. Phase 2 builds into
//! a fresh tree that is only made visible once every source is merged;
//! readers holding an older snapshot keep it.
//!
//! A broken source never stops the run. It is reported through the
//! diagnostics and contributes nothing, while the other sources load normally.

#[path = "loader/metrics.rs"]
mod metrics;

pub use metrics::{LoadMetrics, SourceMetrics};

use crate::dsl::{self, ParsedSource};
use crate::master::{MasterTree, SharedMasterTree};
use crate::registry::Registry;
use crate::{DiagnosticKind, Diagnostics, LoaderOptions};
use chrono::Local;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

// --- Sources -----------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    File(PathBuf),
    Text(String),
}

/// A named sitemap definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapSource {
    pub name: String,
    pub origin: SourceOrigin,
}

impl SitemapSource {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        SitemapSource { name: name.into(), origin: SourceOrigin::File(path.into()) }
    }

    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        SitemapSource { name: name.into(), origin: SourceOrigin::Text(text.into()) }
    }

    pub fn read_lines(&self) -> Result<Vec<String>, SourceError> {
        match &self.origin {
            SourceOrigin::Text(text) => Ok(text.lines().map(str::to_string).collect()),
            SourceOrigin::File(path) => {
                let text =
                    std::fs::read_to_string(path).map_err(|source| SourceError::Io { path: path.clone(), source })?;
                Ok(text.lines().map(str::to_string).collect())
            }
        }
    }
}

// --- Report ------------------------------------------------------------------

/// What the last [`SitemapLoader::load`] run found.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    pub diagnostics: Diagnostics,
    pub metrics: LoadMetrics,
    /// Label-key names that matched no key, across all sources.
    pub missing_label_keys: BTreeSet<String>,
}

// --- Loader ------------------------------------------------------------------

pub struct SitemapLoader {
    registry: Registry,
    target: SharedMasterTree,
    sources: Vec<SitemapSource>,
    options: LoaderOptions,
    report: Option<LoadReport>,
}

impl SitemapLoader {
    pub fn new(registry: Registry, target: SharedMasterTree) -> Self {
        SitemapLoader { registry, target, sources: Vec::new(), options: LoaderOptions::default(), report: None }
    }

    pub fn with_sources<I: IntoIterator<Item = SitemapSource>>(mut self, sources: I) -> Self {
        self.sources.extend(sources);
        self
    }

    pub fn with_options(mut self, options: LoaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn add_source(&mut self, source: SitemapSource) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> &[SitemapSource] {
        &self.sources
    }

    pub fn target(&self) -> &SharedMasterTree {
        &self.target
    }

    /// Parse every source and publish the merged tree.
    ///
    /// Returns `false` only when no source is configured; in that case the
    /// published tree is left untouched. Problems inside sources are reported
    /// through [`report`](Self::report), never as a failure of the run.
    pub fn load(&mut self) -> bool {
        if self.sources.is_empty() {
            tracing::info!("no sitemap sources configured, nothing to load");
            return false;
        }

        let started_at = Local::now();
        let start = Instant::now();
        tracing::info!(sources = self.sources.len(), parallel = self.options.parallel, "loading sitemap");

        let parsed = if self.options.parallel { self.parse_parallel() } else { self.parse_sequential() };

        let mut tree = MasterTree::new();
        let mut report = LoadReport::default();
        for (source, duration) in parsed {
            report.metrics.sources.push(source_metrics(&source, duration));
            merge(&mut tree, &source);
            report.missing_label_keys.extend(source.missing_label_keys);
            report.diagnostics.extend(source.diagnostics);
        }

        let pages = tree.node_count();
        self.target.publish(tree);

        report.metrics.started_at = started_at;
        report.metrics.finished_at = Local::now();
        report.metrics.total = start.elapsed();
        tracing::info!(
            pages,
            diagnostics = report.diagnostics.len(),
            elapsed_ms = report.metrics.total.as_millis() as u64,
            "sitemap loaded"
        );
        self.report = Some(report);
        true
    }

    /// Report of the last run, if `load` has processed any source.
    pub fn report(&self) -> Option<&LoadReport> {
        self.report.as_ref()
    }

    pub fn take_report(&mut self) -> Option<LoadReport> {
        self.report.take()
    }

    /// Diagnostics of the last run; empty before the first run.
    pub fn diagnostics(&self) -> Diagnostics {
        self.report.as_ref().map(|r| r.diagnostics.clone()).unwrap_or_default()
    }

    fn parse_sequential(&self) -> Vec<(ParsedSource, Duration)> {
        self.sources.iter().map(|source| self.parse_one(source)).collect()
    }

    fn parse_parallel(&self) -> Vec<(ParsedSource, Duration)> {
        std::thread::scope(|scope| {
            let handles: Vec<_> =
                self.sources.iter().map(|source| scope.spawn(move || self.parse_one(source))).collect();
            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(parsed) => parsed,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }

    fn parse_one(&self, source: &SitemapSource) -> (ParsedSource, Duration) {
        let start = Instant::now();
        let parsed = match source.read_lines() {
            Ok(lines) => dsl::parse_source(&source.name, &lines, &self.registry, &self.options),
            Err(err) => unreadable(&source.name, &err),
        };
        (parsed, start.elapsed())
    }
}

fn unreadable(name: &str, err: &SourceError) -> ParsedSource {
    let mut diagnostics = Diagnostics::new();
    crate::diag!(diagnostics, name, None, DiagnosticKind::SourceUnreadable, [err]);
    ParsedSource { name: name.to_string(), diagnostics, ..Default::default() }
}

fn merge(tree: &mut MasterTree, source: &ParsedSource) {
    if !source.complete {
        tracing::debug!(source = %source.name, "source incomplete, skipped");
        return;
    }
    for record in &source.records {
        tree.append(record.clone());
    }
    for redirect in &source.redirects {
        tree.add_redirect(&redirect.from, &redirect.to);
    }
}

fn source_metrics(source: &ParsedSource, duration: Duration) -> SourceMetrics {
    SourceMetrics {
        name: source.name.clone(),
        duration,
        comment_lines: source.comment_lines,
        blank_lines: source.blank_lines,
        pages_defined: source.records.len(),
        redirects: source.redirects.len(),
        missing_label_keys: source.missing_label_keys.len(),
        aborted: !source.complete,
    }
}
