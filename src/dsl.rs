//! Sitemap definition parser.
//!
//! A sitemap source is a line-oriented text file with four mandatory sections:
//!
//! ```text
//! [options]          key=value properties (appendView, labelKeys)
//! [viewPackages]     ordered namespaces searched for views
//! [map]              one page per line, indent with leading '-'
//! [redirects]        from:to
//! ```
//!
//! Parsing one source is a pure function of its lines, the registry and the
//! loader options. Nothing here touches a shared tree; the result is a
//! [`ParsedSource`] that the loader merges afterwards. That is what allows
//! sources to be parsed on separate threads.
//!
//! ## How the parts work together
//!
//! ```text
//! lines ── Sections::divide ──────────── (sections.rs)
//!              │  all four headers seen?
//!              │      no ──▶ SectionMissing, stop
//!              ▼
//!          read_options ───────────────── (options.rs)
//!              ▼
//!          NameResolver::new ──────────── (names.rs)
//!              ▼
//!          read_map ── decode ─┐          (map_line.rs)
//!                   PathTracker┘          (path.rs)
//!              ▼
//!          unresolved label keys ──▶ one aggregate diagnostic
//!              ▼
//!          read_redirects ─────────────── (redirects.rs)
//!              ▼
//!          ParsedSource
//! ```

#[path = "dsl/map_line.rs"]
pub mod map_line;
#[path = "dsl/names.rs"]
pub mod names;
#[path = "dsl/options.rs"]
mod options;
#[path = "dsl/path.rs"]
mod path;
#[path = "dsl/redirects.rs"]
mod redirects;
#[path = "dsl/sections.rs"]
mod sections;

pub use map_line::{INDENT_MARKER, MapLineError, MapLineRecord};
pub use names::NameResolver;
pub use options::{SourceOptions, read_options};
pub use path::{IndentGap, PathTracker, Tracked};
pub use redirects::{Redirect, read_redirects};
pub use sections::{SectionName, SectionSet, Sections, SourceLine};

use crate::master::NodeRecord;
use crate::registry::Registry;
use crate::{DiagnosticKind, Diagnostics, LoaderOptions};
use std::collections::BTreeSet;

/// Everything one source contributes, before it is merged into a tree.
#[derive(Debug, Clone, Default)]
pub struct ParsedSource {
    pub name: String,
    /// False when a mandatory section was missing; such a source contributes nothing.
    pub complete: bool,
    pub records: Vec<NodeRecord>,
    pub redirects: Vec<Redirect>,
    pub diagnostics: Diagnostics,
    pub comment_lines: usize,
    pub blank_lines: usize,
    pub missing_label_keys: BTreeSet<String>,
}

/// State threaded through the parse of one source.
struct ParseContext<'a> {
    source: &'a str,
    registry: &'a Registry,
    options: &'a LoaderOptions,
    diagnostics: Diagnostics,
}

/// Parse the lines of one source.
pub fn parse_source<S: AsRef<str>>(
    name: &str,
    lines: &[S],
    registry: &Registry,
    options: &LoaderOptions,
) -> ParsedSource {
    let mut ctx = ParseContext { source: name, registry, options, diagnostics: Diagnostics::new() };
    let sections = Sections::divide(ctx.source, lines, &mut ctx.diagnostics);

    let mut parsed = ParsedSource {
        name: name.to_string(),
        comment_lines: sections.comment_lines,
        blank_lines: sections.blank_lines,
        ..Default::default()
    };

    let missing = sections.missing();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|s| s.as_str()).collect();
        crate::diag!(ctx.diagnostics, ctx.source, None, DiagnosticKind::SectionMissing, [names.join(", ")]);
        parsed.diagnostics = ctx.diagnostics;
        return parsed;
    }

    process(&mut ctx, &sections, &mut parsed);
    parsed.complete = true;
    parsed.diagnostics = ctx.diagnostics;

    tracing::debug!(
        source = name,
        pages = parsed.records.len(),
        redirects = parsed.redirects.len(),
        diagnostics = parsed.diagnostics.len(),
        "parsed sitemap source"
    );
    parsed
}

fn process(ctx: &mut ParseContext<'_>, sections: &Sections, parsed: &mut ParsedSource) {
    let options = read_options(ctx.source, sections.lines(SectionName::Options), ctx.registry, &mut ctx.diagnostics);
    let packages: Vec<&str> = sections.lines(SectionName::ViewPackages).iter().map(|l| l.text.as_str()).collect();

    let mut resolver = NameResolver::new(ctx.source, ctx.registry, packages, &options, &ctx.options.view_suffix);
    parsed.records = map_line::read_map(
        ctx.source,
        sections.lines(SectionName::Map),
        ctx.options.field_delimiter,
        &mut resolver,
        &mut ctx.diagnostics,
    );

    let missing = resolver.into_missing();
    if let Some(key_type) = options.key_type {
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(String::as_str).collect();
            crate::diag!(
                ctx.diagnostics,
                ctx.source,
                None,
                DiagnosticKind::UnresolvedLabelKeyNames,
                [names.join(", "), key_type.name]
            );
        }
    }
    parsed.missing_label_keys = missing;

    parsed.redirects = read_redirects(
        ctx.source,
        sections.lines(SectionName::Redirects),
        ctx.options.redirect_delimiter,
        &mut ctx.diagnostics,
    );
}
