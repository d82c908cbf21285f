//! Section division.
//!
//! The first pass over a source only classifies lines. Each line is stripped of
//! all whitespace and then falls into one of:
//!
//! ```text
//! "# ..."         comment      counted, dropped
//! ""              blank        counted, dropped
//! "[name]"        header       opens (and resets) section `name`
//! "[name"         bad header   WARNING, closes the open section
//! anything else   content      appended to the open section, if any
//! ```
//!
//! Which headers were seen is tracked in a [`SectionSet`]; the caller uses
//! [`Sections::missing`] to decide whether the source can be processed at all.

use crate::{DiagnosticKind, Diagnostics};
use std::fmt;

bitflags::bitflags! {
    /// Sections whose header has been seen in a source.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SectionSet: u8 {
        const OPTIONS       = 1 << 0;
        const VIEW_PACKAGES = 1 << 1;
        const MAP           = 1 << 2;
        const REDIRECTS     = 1 << 3;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionName {
    Options,
    ViewPackages,
    Map,
    Redirects,
}

impl SectionName {
    pub const ALL: [SectionName; 4] =
        [SectionName::Options, SectionName::ViewPackages, SectionName::Map, SectionName::Redirects];

    pub fn from_header(name: &str) -> Option<Self> {
        match name {
            "options" => Some(SectionName::Options),
            "viewPackages" => Some(SectionName::ViewPackages),
            "map" => Some(SectionName::Map),
            "redirects" => Some(SectionName::Redirects),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionName::Options => "options",
            SectionName::ViewPackages => "viewPackages",
            SectionName::Map => "map",
            SectionName::Redirects => "redirects",
        }
    }

    pub fn flag(self) -> SectionSet {
        match self {
            SectionName::Options => SectionSet::OPTIONS,
            SectionName::ViewPackages => SectionSet::VIEW_PACKAGES,
            SectionName::Map => SectionSet::MAP,
            SectionName::Redirects => SectionSet::REDIRECTS,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content line with its 1-based position in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

impl SourceLine {
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        SourceLine { number, text: text.into() }
    }
}

/// Content of one source, divided by section.
#[derive(Debug, Clone, Default)]
pub struct Sections {
    content: [Vec<SourceLine>; 4],
    seen: SectionSet,
    pub comment_lines: usize,
    pub blank_lines: usize,
}

impl Sections {
    /// Classify `lines` of `source` into sections.
    pub fn divide<S: AsRef<str>>(source: &str, lines: &[S], diags: &mut Diagnostics) -> Self {
        let mut sections = Sections::default();
        let mut current: Option<SectionName> = None;

        for (idx, raw) in lines.iter().enumerate() {
            let number = idx + 1;
            let line: String = raw.as_ref().chars().filter(|c| !c.is_whitespace()).collect();

            if line.starts_with('#') {
                sections.comment_lines += 1;
                continue;
            }
            if line.is_empty() {
                sections.blank_lines += 1;
                continue;
            }
            if line.starts_with('[') {
                current = sections.open(source, number, &line, diags);
                continue;
            }
            if let Some(name) = current {
                sections.content[name.index()].push(SourceLine::new(number, line));
            }
        }

        tracing::debug!(
            source,
            seen = ?sections.seen,
            comments = sections.comment_lines,
            blanks = sections.blank_lines,
            "divided source into sections"
        );
        sections
    }

    fn open(&mut self, source: &str, number: usize, header: &str, diags: &mut Diagnostics) -> Option<SectionName> {
        let Some(inner) = header.strip_prefix('[').and_then(|h| h.strip_suffix(']')) else {
            crate::diag!(diags, source, Some(number), DiagnosticKind::SectionMissingClosingBracket, [header]);
            return None;
        };

        match SectionName::from_header(inner) {
            Some(name) => {
                self.content[name.index()].clear();
                self.seen |= name.flag();
                Some(name)
            }
            None => {
                crate::diag!(diags, source, Some(number), DiagnosticKind::SectionNotRecognized, [inner, valid_names()]);
                None
            }
        }
    }

    pub fn lines(&self, name: SectionName) -> &[SourceLine] {
        &self.content[name.index()]
    }

    pub fn seen(&self) -> SectionSet {
        self.seen
    }

    /// Sections whose header never appeared, in declaration order.
    pub fn missing(&self) -> Vec<SectionName> {
        SectionName::ALL.into_iter().filter(|name| !self.seen.contains(name.flag())).collect()
    }
}

/// Alphabetical list of valid section names, as shown in warnings.
fn valid_names() -> String {
    let mut names: Vec<&str> = SectionName::ALL.iter().map(|n| n.as_str()).collect();
    names.sort_unstable();
    format!("[{}]", names.join(", "))
}
