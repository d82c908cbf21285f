//! Navigation sitemaps for page-based applications.
//!
//! A sitemap is written in a small line-oriented text format, parsed into a
//! shared [`MasterTree`] by the [`SitemapLoader`], and projected per session
//! into a [`UserTree`] that only holds the pages the current identity may see.
//!
//! ```text
//! sources ──▶ dsl::parse_source ──▶ SitemapLoader ──▶ SharedMasterTree
//!                   (per source)        (merge)              │
//!                                                            ▼
//!                                  Subject ──▶ UserTreeBuilder ──▶ UserTree
//! ```
//!
//! # Example
//! ```
//! use navmap::{LoaderOptions, Registry, load_text};
//!
//! let registry = Registry::new().with_page_view("app", "HomeView");
//! let text = "[options]\nappendView=true\n[viewPackages]\napp\n[map]\nhome\n[redirects]\n";
//! let (tree, report) = load_text("main", text, &registry, &LoaderOptions::default());
//!
//! assert_eq!(tree.node("home").and_then(|n| n.view()).map(|v| v.as_str()), Some("app.HomeView"));
//! assert!(!report.diagnostics.has_errors());
//! ```

#[macro_use]
mod macros;
mod api;
pub mod diagnostics;
pub mod dsl;
pub mod loader;
pub mod master;
pub mod registry;
pub mod user;

pub use api::{LoaderOptions, load_text};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use loader::{LoadMetrics, LoadReport, SitemapLoader, SitemapSource, SourceError, SourceMetrics};
pub use master::{MasterNode, MasterTree, NodeId, NodeRecord, SharedMasterTree};
pub use registry::{KeyType, LabelKey, Registry, RegistryError, ViewId};
pub use user::{BuildOutcome, PagePermission, StaticSubject, Subject, UserNode, UserTree, UserTreeBuilder};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// --- Access control ---------------------------------------------------------

/// Who may see a page.
///
/// Names are matched case-insensitively; `authentication`, `roles` and `guest`
/// are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessMode {
    #[default]
    Public,
    Authenticated,
    Permission,
    Role,
    GuestOnly,
}

impl AccessMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessMode::Public => "public",
            AccessMode::Authenticated => "authenticated",
            AccessMode::Permission => "permission",
            AccessMode::Role => "role",
            AccessMode::GuestOnly => "guest-only",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{0}' is not an access-control mode")]
pub struct AccessModeError(pub String);

impl FromStr for AccessMode {
    type Err = AccessModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "public" => Ok(AccessMode::Public),
            "authenticated" | "authentication" => Ok(AccessMode::Authenticated),
            "permission" => Ok(AccessMode::Permission),
            "role" | "roles" => Ok(AccessMode::Role),
            "guest" | "guest-only" => Ok(AccessMode::GuestOnly),
            _ => Err(AccessModeError(s.to_string())),
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
