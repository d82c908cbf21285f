use navmap::{Diagnostic, LoadReport, MasterNode, MasterTree, NodeRecord, Severity, UserNode, UserTree};
use serde::Serialize;
use std::collections::BTreeMap;

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_load(report: &LoadReport, master: &MasterTree, user: &UserTree, color: bool) {
    let palette = ansi::Palette::new(color);
    let sources = report.metrics.sources.len();
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Loaded {sources} source(s)"), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Diagnostics ━━━", ansi::GRAY));
    if report.diagnostics.is_empty() {
        println!("{}", palette.dim("  No diagnostics"));
    } else {
        for diagnostic in &report.diagnostics {
            println!("  {}", fmt_diagnostic(diagnostic, &palette));
        }
    }
    if !report.missing_label_keys.is_empty() {
        let names: Vec<&str> = report.missing_label_keys.iter().map(String::as_str).collect();
        println!("  {} {}", palette.dim("unresolved label keys:"), palette.paint(names.join(", "), ansi::YELLOW));
    }

    println!("\n{}", palette.paint("━━━ Master tree ━━━", ansi::GRAY));
    if master.is_empty() {
        println!("{}", palette.dim("  No pages"));
    }
    for root in master.roots() {
        print_master_node(master, root, &palette);
    }

    if !master.redirects().is_empty() {
        println!("\n{}", palette.paint("━━━ Redirects ━━━", ansi::GRAY));
        for (from, to) in master.redirects() {
            println!("  {} {} {}", palette.paint(from, ansi::YELLOW), palette.dim("→"), palette.paint(to, ansi::GREEN));
        }
    }

    println!("\n{}", palette.paint("━━━ User tree ━━━", ansi::GRAY));
    if user.is_empty() {
        println!("{}", palette.dim("  No accessible pages"));
    }
    for root in user.roots() {
        print_user_node(user, root, &palette);
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    for source in &report.metrics.sources {
        let status = if source.aborted {
            palette.paint("✗ skipped", ansi::RED)
        } else {
            palette.paint(format!("✓ {} pages", source.pages_defined), ansi::GREEN)
        };
        println!(
            "  {} {}  {} {}",
            palette.paint(&source.name, ansi::BLUE),
            status,
            palette.dim(format!("{} redirects, {} comments, {} blank", source.redirects, source.comment_lines, source.blank_lines)),
            palette.dim(format!("{:?}", source.duration)),
        );
    }
    println!(
        "  Total: {}  │  Started: {}",
        palette.paint(format!("{:?}", report.metrics.total), ansi::GREEN),
        palette.dim(report.metrics.started_at.format("%Y-%m-%d %H:%M:%S").to_string()),
    );
    println!();
}

fn print_master_node(tree: &MasterTree, node: &MasterNode, palette: &ansi::Palette) {
    let indent = "  ".repeat(node.depth());
    let view = node.view().map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
    println!(
        "{indent}{} {} {}",
        palette.bold(node.segment()),
        palette.paint(view, ansi::CYAN),
        fmt_access(node.record(), palette),
    );
    for child in tree.children(node) {
        print_master_node(tree, child, palette);
    }
}

fn print_user_node(tree: &UserTree, node: &UserNode, palette: &ansi::Palette) {
    let indent = "  ".repeat(node.uri.split('/').count());
    let label = node.label_key.as_ref().map(|k| k.to_string()).unwrap_or_default();
    println!("{indent}{} {}", palette.bold(&node.segment), palette.dim(label));
    for child in tree.children(&node.uri) {
        print_user_node(tree, child, palette);
    }
}

fn fmt_access(record: &NodeRecord, palette: &ansi::Palette) -> String {
    if record.roles.is_empty() {
        return palette.dim(record.access.as_str());
    }
    let roles: Vec<&str> = record.roles.iter().map(String::as_str).collect();
    palette.dim(format!("{} [{}]", record.access, roles.join(",")))
}

fn fmt_diagnostic(diagnostic: &Diagnostic, palette: &ansi::Palette) -> String {
    let color = match diagnostic.severity {
        Severity::Error => ansi::RED,
        Severity::Warning => ansi::YELLOW,
        Severity::Info => ansi::BLUE,
    };
    let location = match diagnostic.line {
        Some(line) => format!("{}:{}", diagnostic.source, line),
        None => diagnostic.source.clone(),
    };
    format!("{} {} {}", palette.paint(format!("{:<7}", diagnostic.severity), color), palette.dim(location), diagnostic.message())
}

// --- JSON --------------------------------------------------------------------

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a LoadReport,
    pages: Vec<&'a MasterNode>,
    redirects: &'a BTreeMap<String, String>,
    user_pages: Vec<&'a UserNode>,
}

pub fn to_json(report: &LoadReport, master: &MasterTree, user: &UserTree) -> serde_json::Result<String> {
    let mut pages: Vec<&MasterNode> = master.all_nodes().collect();
    pages.sort_by(|a, b| a.uri().cmp(b.uri()));
    let json = JsonReport { report, pages, redirects: master.redirects(), user_pages: user.iter().collect() };
    serde_json::to_string_pretty(&json)
}
