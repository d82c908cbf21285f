//! `[redirects]` section: `from:to` pairs.
//!
//! Only the first two delimiter-separated parts count; `a:b:c` redirects `a`
//! to `b`. A line without the delimiter is ignored with an INFO diagnostic, and
//! so is `old:` or `:new`, with its own message.

use super::sections::SourceLine;
use crate::{DiagnosticKind, Diagnostics};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub from: String,
    pub to: String,
}

pub fn read_redirects(source: &str, lines: &[SourceLine], delimiter: char, diags: &mut Diagnostics) -> Vec<Redirect> {
    let mut redirects = Vec::with_capacity(lines.len());

    for line in lines {
        let mut parts = line.text.split(delimiter).map(str::trim);
        let (Some(from), Some(to)) = (parts.next(), parts.next()) else {
            crate::diag!(diags, source, Some(line.number), DiagnosticKind::RedirectInvalid, [line.text, delimiter]);
            continue;
        };
        if from.is_empty() || to.is_empty() {
            crate::diag!(diags, source, Some(line.number), DiagnosticKind::RedirectSideEmpty, [line.text]);
            continue;
        }
        redirects.push(Redirect { from: from.to_string(), to: to.to_string() });
    }

    redirects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;

    #[test]
    fn extra_parts_are_discarded() {
        let mut diags = Diagnostics::new();
        let redirects = read_redirects("s", &[SourceLine::new(9, "old:home:extra")], ':', &mut diags);

        assert_eq!(redirects, vec![Redirect { from: "old".into(), to: "home".into() }]);
        assert!(diags.is_empty());
    }

    #[test]
    fn missing_delimiter_is_one_info() {
        let mut diags = Diagnostics::new();
        let redirects = read_redirects("s", &[SourceLine::new(2, "nowhere")], ':', &mut diags);

        assert!(redirects.is_empty());
        assert_eq!(diags.len(), 1);
        let info = diags.iter().next().unwrap();
        assert_eq!(info.severity, Severity::Info);
        assert_eq!(info.kind, DiagnosticKind::RedirectInvalid);
        assert_eq!(info.line, Some(2));
    }

    #[test]
    fn empty_side_is_ignored() {
        let mut diags = Diagnostics::new();
        let lines = [SourceLine::new(1, "old:"), SourceLine::new(2, ":new")];
        assert!(read_redirects("s", &lines, ':', &mut diags).is_empty());
        assert_eq!(diags.of_kind(DiagnosticKind::RedirectInvalid).count(), 0);

        let empty: Vec<_> = diags.of_kind(DiagnosticKind::RedirectSideEmpty).collect();
        assert_eq!(empty.len(), 2);
        assert_eq!(empty[0].severity, Severity::Info);
        assert_eq!(empty[0].message(), "redirect 'old:' has an empty side, ignored");
        assert_eq!(empty[1].line, Some(2));
    }
}
