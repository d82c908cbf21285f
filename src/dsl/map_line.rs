//! `[map]` section.
//!
//! A map line declares one page:
//!
//! ```text
//! --segment;viewName;labelKeyName;role1,role2;accessMode
//! ^^ indent  ^ only the segment is required, empty fields mean "absent"
//! ```
//!
//! Decoding a line never touches the tree: [`decode`] turns text into a
//! [`MapLineRecord`], then [`read_map`] threads the records through the
//! [`PathTracker`] and [`NameResolver`] to produce [`NodeRecord`]s.

use super::names::NameResolver;
use super::path::PathTracker;
use super::sections::SourceLine;
use crate::master::NodeRecord;
use crate::{AccessMode, AccessModeError, DiagnosticKind, Diagnostics};
use std::collections::BTreeSet;
use thiserror::Error;

/// Each leading occurrence adds one indent level.
pub const INDENT_MARKER: char = '-';

const MAX_FIELDS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapLineError {
    #[error("no page segment")]
    EmptySegment,
    #[error("'{0}' is not a valid URI segment")]
    InvalidSegment(String),
    #[error("expected at most 5 fields, found {0}")]
    TooManyFields(usize),
    #[error(transparent)]
    AccessMode(#[from] AccessModeError),
}

/// One decoded map line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapLineRecord {
    pub line: usize,
    pub indent: usize,
    pub segment: String,
    pub view_name: Option<String>,
    pub key_name: Option<String>,
    pub roles: BTreeSet<String>,
    pub access: AccessMode,
    pub failure: Option<MapLineError>,
}

impl MapLineRecord {
    fn new(line: usize, indent: usize) -> Self {
        MapLineRecord {
            line,
            indent,
            segment: String::new(),
            view_name: None,
            key_name: None,
            roles: BTreeSet::new(),
            access: AccessMode::default(),
            failure: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    fn fail(mut self, err: impl Into<MapLineError>) -> Self {
        self.failure = Some(err.into());
        self
    }
}

/// Decode a single (whitespace-free) map line.
pub fn decode(line: &SourceLine, delimiter: char) -> MapLineRecord {
    let body = line.text.trim_start_matches(INDENT_MARKER);
    let indent = line.text.len() - body.len();
    let mut record = MapLineRecord::new(line.number, indent);

    let fields: Vec<&str> = body.split(delimiter).collect();
    if fields.len() > MAX_FIELDS {
        return record.fail(MapLineError::TooManyFields(fields.len()));
    }

    let segment = fields[0];
    if segment.is_empty() {
        return record.fail(MapLineError::EmptySegment);
    }
    if !crate::regex!(r"^[\w.~][\w.~-]*$").is_match(segment) {
        return record.fail(MapLineError::InvalidSegment(segment.to_string()));
    }
    record.segment = segment.to_string();

    let field = |idx: usize| fields.get(idx).copied().filter(|f| !f.is_empty());
    record.view_name = field(1).map(str::to_string);
    record.key_name = field(2).map(str::to_string);
    if let Some(roles) = field(3) {
        record.roles = roles.split(',').map(str::trim).filter(|r| !r.is_empty()).map(str::to_string).collect();
    }
    if let Some(mode) = field(4) {
        match mode.parse::<AccessMode>() {
            Ok(access) => record.access = access,
            Err(err) => return record.fail(err),
        }
    }

    record
}

/// Turn the `[map]` lines of a source into node records.
///
/// Failed lines are reported as `MapLineInvalid` and skipped, but still hold
/// their indent level, so lines below them attach to the nearest accepted
/// ancestor. A line that skips indent levels is kept under its nearest open
/// ancestor and reported as `MapLineIndentGap`.
pub fn read_map(
    source: &str,
    lines: &[SourceLine],
    delimiter: char,
    resolver: &mut NameResolver<'_>,
    diags: &mut Diagnostics,
) -> Vec<NodeRecord> {
    let mut tracker = PathTracker::new();
    let mut records = Vec::with_capacity(lines.len());

    for line in lines {
        let record = decode(line, delimiter);
        if let Some(err) = &record.failure {
            crate::diag!(diags, source, Some(line.number), DiagnosticKind::MapLineInvalid, [line.text, err]);
            tracker.hold(record.indent);
            continue;
        }

        let tracked = tracker.track(record.indent, &record.segment);
        if let Some(gap) = tracked.gap {
            let kind = DiagnosticKind::MapLineIndentGap;
            crate::diag!(diags, source, Some(line.number), kind, [line.text, gap.level, gap.open, tracked.uri]);
        }
        let uri = tracked.uri;

        let view = resolver.resolve_view(record.view_name.as_deref(), &record.segment, line.number, diags);
        let label_key = resolver.resolve_label(record.key_name.as_deref(), &record.segment);

        records.push(NodeRecord {
            uri,
            segment: record.segment,
            view,
            label_key,
            roles: record.roles,
            access: record.access,
        });
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::SourceOptions;
    use crate::registry::Registry;

    fn line(text: &str) -> SourceLine {
        SourceLine::new(1, text)
    }

    #[test]
    fn decodes_all_fields() {
        let record = decode(&line("--orders;OrderList;Orders;admin,,clerk;permission"), ';');

        assert!(!record.is_failed());
        assert_eq!(record.indent, 2);
        assert_eq!(record.segment, "orders");
        assert_eq!(record.view_name.as_deref(), Some("OrderList"));
        assert_eq!(record.key_name.as_deref(), Some("Orders"));
        assert_eq!(record.roles, BTreeSet::from(["admin".to_string(), "clerk".to_string()]));
        assert_eq!(record.access, AccessMode::Permission);
    }

    #[test]
    fn empty_fields_are_absent() {
        let record = decode(&line("-about;;;;"), ';');
        assert_eq!(record.indent, 1);
        assert_eq!(record.view_name, None);
        assert_eq!(record.key_name, None);
        assert!(record.roles.is_empty());
        assert_eq!(record.access, AccessMode::Public);
    }

    #[test]
    fn custom_delimiter() {
        let record = decode(&line("home|HomePage"), '|');
        assert_eq!(record.view_name.as_deref(), Some("HomePage"));
    }

    #[test]
    fn failures_carry_reason() {
        assert_eq!(decode(&line("---"), ';').failure, Some(MapLineError::EmptySegment));
        assert_eq!(decode(&line(";View"), ';').failure, Some(MapLineError::EmptySegment));
        assert_eq!(decode(&line("a/b"), ';').failure, Some(MapLineError::InvalidSegment("a/b".into())));
        assert_eq!(decode(&line("a;b;c;d;e;f"), ';').failure, Some(MapLineError::TooManyFields(6)));

        let bad_mode = decode(&line("a;;;;everyone"), ';');
        assert_eq!(bad_mode.failure.unwrap().to_string(), "'everyone' is not an access-control mode");
    }

    #[test]
    fn read_map_builds_uris_and_skips_bad_lines() {
        let registry = Registry::new().with_page_view("ns", "Home").with_page_view("ns", "About");
        let options = SourceOptions::default();
        let mut resolver = NameResolver::new("s", &registry, vec!["ns"], &options, "View");
        let mut diags = Diagnostics::new();
        let lines = vec![
            SourceLine::new(3, "home"),
            SourceLine::new(4, "---lost"),
            SourceLine::new(5, "-about"),
            SourceLine::new(6, "-bad/segment"),
        ];

        let records = read_map("s", &lines, ';', &mut resolver, &mut diags);

        let uris: Vec<&str> = records.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["home", "home/lost", "home/about"]);
        assert_eq!(records[2].view.as_ref().map(|v| v.as_str()), Some("ns.About"));

        let gaps: Vec<_> = diags.of_kind(DiagnosticKind::MapLineIndentGap).collect();
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].line, Some(4));
        assert_eq!(gaps[0].severity, crate::Severity::Warning);
        assert_eq!(gaps[0].message(), "map line '---lost' is at indent level 3 with 1 level(s) open, placed at 'home/lost'");

        let invalid: Vec<_> = diags.of_kind(DiagnosticKind::MapLineInvalid).collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].line, Some(6));
    }

    #[test]
    fn children_of_a_failed_line_are_not_gaps() {
        let registry = Registry::new();
        let options = SourceOptions::default();
        let mut resolver = NameResolver::new("s", &registry, vec!["ns"], &options, "View");
        let mut diags = Diagnostics::new();
        let lines = vec![
            SourceLine::new(1, "home"),
            SourceLine::new(2, "-account;;;;bogus"),
            SourceLine::new(3, "--help"),
            SourceLine::new(4, "top;;;;bogus"),
            SourceLine::new(5, "-about"),
        ];

        let records = read_map("s", &lines, ';', &mut resolver, &mut diags);

        let uris: Vec<&str> = records.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["home", "home/help", "about"]);
        assert_eq!(diags.of_kind(DiagnosticKind::MapLineInvalid).count(), 2);
        assert_eq!(diags.of_kind(DiagnosticKind::MapLineIndentGap).count(), 0);
    }
}
