//! Load diagnostics.
//!
//! Nothing in the loader fails hard on malformed input. Every problem found
//! while dividing, decoding or resolving a source becomes a [`Diagnostic`]
//! that is collected into [`Diagnostics`] and handed back to the caller with
//! the load report.
//!
//! A diagnostic keeps its message *template* and the formatted parameters
//! separately so callers can match on [`DiagnosticKind`] (tests do) or render
//! the filled-in message (the CLI does).
//!
//! ```text
//! kind ──▶ severity + template ──┐
//! params ────────────────────────┴─▶ message()
//! ```

use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        };
        f.write_str(s)
    }
}

/// Every problem the loader knows how to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    SectionMissing,
    SectionNotRecognized,
    SectionMissingClosingBracket,
    PropertyMissingEquals,
    PropertyMissingKey,
    PropertyMissingValue,
    PropertyNameUnrecognized,
    LabelKeyTypeNotFound,
    LabelKeyTypeNotEnumeration,
    LabelKeyTypeNotLocalizable,
    ViewNotFound,
    ViewNotPageView,
    MapLineInvalid,
    MapLineIndentGap,
    RedirectInvalid,
    RedirectSideEmpty,
    UnresolvedLabelKeyNames,
    SourceUnreadable,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::SectionNotRecognized
            | DiagnosticKind::SectionMissingClosingBracket
            | DiagnosticKind::PropertyNameUnrecognized
            | DiagnosticKind::MapLineIndentGap => Severity::Warning,
            DiagnosticKind::RedirectInvalid | DiagnosticKind::RedirectSideEmpty => Severity::Info,
            _ => Severity::Error,
        }
    }

    /// Message template; each `{}` is filled by the next parameter.
    pub fn template(self) -> &'static str {
        match self {
            DiagnosticKind::SectionMissing => "section(s) missing: {}",
            DiagnosticKind::SectionNotRecognized => "section '{}' is not recognized, valid sections are {}",
            DiagnosticKind::SectionMissingClosingBracket => "section header '{}' is missing its closing bracket",
            DiagnosticKind::PropertyMissingEquals => "line in section [{}] is missing '='",
            DiagnosticKind::PropertyMissingKey => "line in section [{}] has no key before '='",
            DiagnosticKind::PropertyMissingValue => "property '{}' in section [{}] has no value",
            DiagnosticKind::PropertyNameUnrecognized => "'{}' is not a recognized option, ignored",
            DiagnosticKind::LabelKeyTypeNotFound => "label key type '{}' is not registered",
            DiagnosticKind::LabelKeyTypeNotEnumeration => "label key type '{}' is not an enumeration",
            DiagnosticKind::LabelKeyTypeNotLocalizable => "label key type '{}' is not a localizable key",
            DiagnosticKind::ViewNotFound => "view '{}' not found in any configured namespace",
            DiagnosticKind::ViewNotPageView => "'{}' does not implement the page view capability",
            DiagnosticKind::MapLineInvalid => "map line '{}' is invalid: {}",
            DiagnosticKind::MapLineIndentGap => "map line '{}' is at indent level {} with {} level(s) open, placed at '{}'",
            DiagnosticKind::RedirectInvalid => "redirect '{}' is not a 'from{}to' pair, ignored",
            DiagnosticKind::RedirectSideEmpty => "redirect '{}' has an empty side, ignored",
            DiagnosticKind::UnresolvedLabelKeyNames => "label key names [{}] are not members of {}",
            DiagnosticKind::SourceUnreadable => "unable to read source: {}",
        }
    }
}

/// A single recorded problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Name of the source the problem was found in.
    pub source: String,
    #[serde(skip)]
    pub template: &'static str,
    pub params: Vec<String>,
    /// 1-based physical line in the source, when the problem belongs to one line.
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, source: &str, line: Option<usize>, params: Vec<String>) -> Self {
        Diagnostic { severity: kind.severity(), kind, source: source.to_string(), template: kind.template(), params, line }
    }

    /// The template with its parameters substituted in order.
    pub fn message(&self) -> String {
        let mut out = String::with_capacity(self.template.len() + 16);
        let mut params = self.params.iter();
        let mut rest = self.template;
        while let Some(at) = rest.find("{}") {
            out.push_str(&rest[..at]);
            match params.next() {
                Some(p) => out.push_str(p),
                None => out.push_str("{}"),
            }
            rest = &rest[at + 2..];
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} {}:{}: {}", self.severity, self.source, line, self.message()),
            None => write!(f, "{} {}: {}", self.severity, self.source, self.message()),
        }
    }
}

/// Ordered collection of diagnostics for one source or one load run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `diagnostic`, echoing it to the log.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => {
                tracing::error!(source = %diagnostic.source, line = ?diagnostic.line, "{}", diagnostic.message())
            }
            Severity::Warning => {
                tracing::warn!(source = %diagnostic.source, line = ?diagnostic.line, "{}", diagnostic.message())
            }
            Severity::Info => {
                tracing::info!(source = %diagnostic.source, line = ?diagnostic.line, "{}", diagnostic.message())
            }
        }
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.with_severity(severity).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_fills_params_in_order() {
        let d = Diagnostic::new(
            DiagnosticKind::SectionNotRecognized,
            "main",
            Some(4),
            vec!["pages".to_string(), "[map, options, redirects, viewPackages]".to_string()],
        );
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.message(), "section 'pages' is not recognized, valid sections are [map, options, redirects, viewPackages]");
        assert_eq!(d.to_string(), format!("WARNING main:4: {}", d.message()));
    }

    #[test]
    fn message_keeps_placeholder_when_params_run_out() {
        let d = Diagnostic::new(DiagnosticKind::MapLineInvalid, "main", None, vec!["-home".to_string()]);
        assert_eq!(d.message(), "map line '-home' is invalid: {}");
    }

    #[test]
    fn collection_filters_by_kind_and_severity() {
        let mut diags = Diagnostics::new();
        crate::diag!(diags, "a", None, DiagnosticKind::RedirectInvalid, ["old", ':']);
        crate::diag!(diags, "a", Some(2), DiagnosticKind::PropertyMissingEquals, ["options"]);

        assert_eq!(diags.len(), 2);
        assert!(diags.has_errors());
        assert_eq!(diags.count(Severity::Info), 1);
        assert_eq!(diags.of_kind(DiagnosticKind::PropertyMissingEquals).count(), 1);
        assert_eq!(diags.of_kind(DiagnosticKind::RedirectInvalid).next().unwrap().message(), "redirect 'old' is not a 'from:to' pair, ignored");
    }
}
