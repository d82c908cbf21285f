use crate::loader::{LoadReport, SitemapLoader, SitemapSource};
use crate::master::{MasterTree, SharedMasterTree};
use crate::registry::Registry;
use std::sync::Arc;

/// Options shared by every source of one load.
///
/// The delimiters apply to the text format; `parallel` only changes how the
/// work is scheduled, never the resulting tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Separates the fields of a `[map]` line.
    pub field_delimiter: char,
    /// Separates the two sides of a `[redirects]` line.
    pub redirect_delimiter: char,
    /// Appended to view names when a source sets `appendView=true`.
    pub view_suffix: String,
    /// Parse sources on separate threads before merging.
    pub parallel: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        LoaderOptions { field_delimiter: ';', redirect_delimiter: ':', view_suffix: "View".to_string(), parallel: false }
    }
}

/// Load a single in-memory source into a fresh tree.
///
/// # Example
/// ```
/// use navmap::{LoaderOptions, Registry, load_text};
///
/// let (tree, report) = load_text("empty", "[options]\n[viewPackages]\n[map]\n[redirects]\n", &Registry::new(), &LoaderOptions::default());
/// assert!(tree.is_empty());
/// assert!(report.diagnostics.is_empty());
/// ```
pub fn load_text(name: &str, text: &str, registry: &Registry, options: &LoaderOptions) -> (Arc<MasterTree>, LoadReport) {
    let shared = SharedMasterTree::new();
    let mut loader = SitemapLoader::new(registry.clone(), shared.clone())
        .with_options(options.clone())
        .with_sources([SitemapSource::text(name, text)]);
    loader.load();
    let report = loader.take_report().unwrap_or_default();
    (shared.snapshot(), report)
}
