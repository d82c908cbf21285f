//! `[options]` section.
//!
//! Each line is a `key=value` property. Two keys are understood:
//!
//! - `appendView`: only the literal `true` turns it on.
//! - `labelKeys`: names the label-key type used for key lookups. The type is
//!   checked against the registry here, once, so every map line can rely on it.

use super::sections::{SectionName, SourceLine};
use crate::registry::{KeyType, KeyTypeError, Registry};
use crate::{DiagnosticKind, Diagnostics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionName {
    AppendView,
    LabelKeys,
}

impl OptionName {
    fn parse(key: &str) -> Option<Self> {
        match key {
            "appendView" => Some(OptionName::AppendView),
            "labelKeys" => Some(OptionName::LabelKeys),
            _ => None,
        }
    }
}

/// Options in effect for one source.
#[derive(Debug, Clone, Default)]
pub struct SourceOptions<'r> {
    pub append_view: bool,
    /// Label-key type name as written in the source.
    pub label_keys: Option<String>,
    /// The validated label-key type, when `label_keys` passed every check.
    pub key_type: Option<&'r KeyType>,
}

pub fn read_options<'r>(
    source: &str,
    lines: &[SourceLine],
    registry: &'r Registry,
    diags: &mut Diagnostics,
) -> SourceOptions<'r> {
    let section = SectionName::Options.as_str();
    let mut options = SourceOptions::default();

    for line in lines {
        let at = Some(line.number);
        let Some((key, value)) = line.text.split_once('=') else {
            crate::diag!(diags, source, at, DiagnosticKind::PropertyMissingEquals, [section]);
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() {
            crate::diag!(diags, source, at, DiagnosticKind::PropertyMissingKey, [section]);
            continue;
        }
        if value.is_empty() {
            crate::diag!(diags, source, at, DiagnosticKind::PropertyMissingValue, [key, section]);
            continue;
        }

        match OptionName::parse(key) {
            Some(OptionName::AppendView) => options.append_view = value == "true",
            Some(OptionName::LabelKeys) => {
                options.label_keys = Some(value.to_string());
                options.key_type = match registry.key_type(value) {
                    Ok(key_type) => Some(key_type),
                    Err(err) => {
                        let kind = match err {
                            KeyTypeError::NotFound(_) => DiagnosticKind::LabelKeyTypeNotFound,
                            KeyTypeError::NotEnumeration(_) => DiagnosticKind::LabelKeyTypeNotEnumeration,
                            KeyTypeError::NotLocalizable(_) => DiagnosticKind::LabelKeyTypeNotLocalizable,
                        };
                        crate::diag!(diags, source, at, kind, [value]);
                        None
                    }
                };
            }
            None => crate::diag!(diags, source, at, DiagnosticKind::PropertyNameUnrecognized, [key]),
        }
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<SourceLine> {
        texts.iter().enumerate().map(|(i, t)| SourceLine::new(i + 2, *t)).collect()
    }

    #[test]
    fn append_view_needs_literal_true() {
        let registry = Registry::new();
        let mut diags = Diagnostics::new();

        let on = read_options("s", &lines(&["appendView=true"]), &registry, &mut diags);
        let off = read_options("s", &lines(&["appendView=yes"]), &registry, &mut diags);

        assert!(on.append_view);
        assert!(!off.append_view);
        assert!(diags.is_empty());
    }

    #[test]
    fn malformed_properties_are_reported_per_line() {
        let registry = Registry::new();
        let mut diags = Diagnostics::new();

        let options =
            read_options("s", &lines(&["appendView", "=true", "appendView=", "colour=blue"]), &registry, &mut diags);

        assert!(!options.append_view);
        let kinds: Vec<DiagnosticKind> = diags.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::PropertyMissingEquals,
                DiagnosticKind::PropertyMissingKey,
                DiagnosticKind::PropertyMissingValue,
                DiagnosticKind::PropertyNameUnrecognized,
            ]
        );
        assert_eq!(diags.iter().map(|d| d.line).collect::<Vec<_>>(), vec![Some(2), Some(3), Some(4), Some(5)]);
    }

    #[test]
    fn label_keys_are_validated_against_registry() {
        let registry = Registry::new()
            .with_key_type(KeyType::enumeration("LabelKey").localizable())
            .with_key_type(KeyType::other("Loose").localizable());
        let mut diags = Diagnostics::new();

        let good = read_options("s", &lines(&["labelKeys=LabelKey"]), &registry, &mut diags);
        assert_eq!(good.key_type.map(|k| k.name.as_str()), Some("LabelKey"));
        assert!(diags.is_empty());

        let missing = read_options("s", &lines(&["labelKeys=Unknown"]), &registry, &mut diags);
        let loose = read_options("s", &lines(&["labelKeys=Loose"]), &registry, &mut diags);
        assert!(missing.key_type.is_none());
        assert!(loose.key_type.is_none());
        assert_eq!(loose.label_keys.as_deref(), Some("Loose"));
        assert_eq!(diags.of_kind(DiagnosticKind::LabelKeyTypeNotFound).count(), 1);
        assert_eq!(diags.of_kind(DiagnosticKind::LabelKeyTypeNotEnumeration).count(), 1);
    }
}
