//! View and label-key name resolution.
//!
//! A map line may name its view and label key explicitly; when it doesn't, the
//! names are derived from the URI segment:
//!
//! ```text
//! segment          view name        key name
//! home             Home             Home
//! user-profile     User_Profile     User_Profile
//! order_history    Order_history    Order_History
//! ```
//!
//! Views are searched in the `[viewPackages]` order and the first namespace
//! holding a page view of that name wins. Label keys are an exact-name lookup
//! in the configured key type; a miss is collected rather than reported one by
//! one, so the loader can emit a single aggregate diagnostic per source.

use super::options::SourceOptions;
use crate::registry::{KeyType, LabelKey, Registry, ViewId};
use crate::{DiagnosticKind, Diagnostics};
use std::collections::BTreeSet;

/// Derive a view name from a URI segment.
pub fn view_name(segment: &str) -> String {
    title_case(&segment.replace('-', " "))
}

/// Derive a label-key name from a URI segment.
pub fn key_name(segment: &str) -> String {
    title_case(&segment.replace(['-', '_'], " "))
}

/// Upper-case the first letter of every space-separated word, then join the
/// words with `_`. Other letters keep their case.
fn title_case(words: &str) -> String {
    let mut out = String::with_capacity(words.len());
    let mut word_start = true;
    for c in words.chars() {
        if c == ' ' {
            out.push('_');
            word_start = true;
        } else if word_start {
            out.extend(c.to_uppercase());
            word_start = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Per-source resolver; built once the options and view packages are known.
#[derive(Debug)]
pub struct NameResolver<'a> {
    source: &'a str,
    registry: &'a Registry,
    packages: Vec<&'a str>,
    append_view: bool,
    view_suffix: &'a str,
    key_type: Option<&'a KeyType>,
    missing: BTreeSet<String>,
}

impl<'a> NameResolver<'a> {
    pub fn new(
        source: &'a str,
        registry: &'a Registry,
        packages: Vec<&'a str>,
        options: &SourceOptions<'a>,
        view_suffix: &'a str,
    ) -> Self {
        NameResolver {
            source,
            registry,
            packages,
            append_view: options.append_view,
            view_suffix,
            key_type: options.key_type,
            missing: BTreeSet::new(),
        }
    }

    /// Find the view for a map line.
    ///
    /// ```text
    /// explicit? ──no──▶ view_name(segment)
    ///     │                   │
    ///     └──────┬────────────┘
    ///            ▼
    ///   + suffix (appendView)
    ///            ▼
    ///   for ns in packages: registry[ns.name]
    ///     page view      -> resolved
    ///     not page view  -> ERROR, keep looking
    ///   nothing named    -> ERROR not found
    /// ```
    pub fn resolve_view(
        &self,
        explicit: Option<&str>,
        segment: &str,
        line: usize,
        diags: &mut Diagnostics,
    ) -> Option<ViewId> {
        let mut name = match explicit {
            Some(name) => name.to_string(),
            None => view_name(segment),
        };
        if self.append_view {
            name.push_str(self.view_suffix);
        }

        let mut seen_any = false;
        for namespace in &self.packages {
            let Some(descriptor) = self.registry.view(namespace, &name) else {
                continue;
            };
            seen_any = true;
            let id = ViewId::new(namespace, &name);
            if descriptor.page_view {
                return Some(id);
            }
            crate::diag!(diags, self.source, Some(line), DiagnosticKind::ViewNotPageView, [id]);
        }

        if !seen_any {
            crate::diag!(diags, self.source, Some(line), DiagnosticKind::ViewNotFound, [name]);
        }
        None
    }

    /// Find the label key for a map line, remembering the name on a miss.
    pub fn resolve_label(&mut self, explicit: Option<&str>, segment: &str) -> Option<LabelKey> {
        let name = match explicit {
            Some(name) => name.to_string(),
            None => key_name(segment),
        };
        let key = self.key_type.and_then(|kt| kt.key_for(&name));
        if key.is_none() {
            self.missing.insert(name);
        }
        key
    }

    /// Label-key names that had no match, sorted.
    pub fn into_missing(self) -> BTreeSet<String> {
        self.missing
    }
}
