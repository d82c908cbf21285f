/// Compile a literal regex once and hand out a `&'static Regex`.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Record a diagnostic and mirror it to `tracing` at the matching level.
///
/// ```text
/// diag!(diags, source, Some(line), DiagnosticKind::PropertyMissingKey, [line, "options"])
/// ```
#[macro_export]
macro_rules! diag {
    ($diags:expr, $source:expr, $line:expr, $kind:expr, [ $($param:expr),* $(,)? ]) => {{
        let params: Vec<String> = vec![ $($param.to_string()),* ];
        $diags.record($crate::Diagnostic::new($kind, $source, $line, params))
    }};
}
