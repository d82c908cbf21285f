mod debug_report;

use clap::Parser;
use navmap::{LoaderOptions, Registry, SharedMasterTree, SitemapLoader, SitemapSource, StaticSubject, UserTreeBuilder};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const EXIT_CODES: &str = "\
Exit codes:
  0  No errors reported.
  1  At least one ERROR diagnostic.
  2  Invalid arguments or unreadable registry.

Set RUST_LOG (e.g. RUST_LOG=navmap=debug) for log output on stderr.";

/// Load sitemap definitions and show the master tree and the tree one identity may see.
#[derive(Debug, Parser)]
#[command(name = "navmap", version, after_help = EXIT_CODES)]
struct Cli {
    /// Sitemap definition files, loaded in order; later files override earlier pages.
    #[arg(required = true, value_name = "FILES")]
    files: Vec<PathBuf>,

    /// JSON registry of views and label-key types.
    #[arg(long, value_name = "JSON")]
    registry: Option<PathBuf>,

    /// Field delimiter of [map] lines.
    #[arg(long, default_value_t = ';')]
    delimiter: char,

    /// Parse files on separate threads.
    #[arg(long)]
    parallel: bool,

    /// Build the user tree for an authenticated identity (implied by --role and --permission).
    #[arg(long)]
    authenticated: bool,

    /// Role held by the identity; repeatable.
    #[arg(long = "role", value_name = "ROLE")]
    roles: Vec<String>,

    /// Permission held by the identity, wildcards allowed (e.g. page:view:*); repeatable.
    #[arg(long = "permission", value_name = "PERMISSION")]
    permissions: Vec<String>,

    /// Print a machine-readable JSON report.
    #[arg(long)]
    json: bool,

    /// Force ANSI color output.
    #[arg(long, conflicts_with = "no_color")]
    color: bool,

    /// Disable ANSI color output.
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn subject(&self) -> StaticSubject {
        if !self.authenticated && self.roles.is_empty() && self.permissions.is_empty() {
            return StaticSubject::guest();
        }
        let subject = self.roles.iter().fold(StaticSubject::authenticated(), |s, role| s.with_role(role.as_str()));
        self.permissions.iter().fold(subject, |s, permission| s.with_permission(permission))
    }

    fn color(&self) -> bool {
        self.color || (!self.no_color && io::stdout().is_terminal())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let registry = match &cli.registry {
        Some(path) => match Registry::from_path(path) {
            Ok(registry) => registry,
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::from(2);
            }
        },
        None => Registry::new(),
    };

    let options = LoaderOptions { field_delimiter: cli.delimiter, parallel: cli.parallel, ..Default::default() };
    let sources = cli.files.iter().map(|path| SitemapSource::file(path.display().to_string(), path));
    let master = SharedMasterTree::new();
    let mut loader = SitemapLoader::new(registry, master.clone()).with_options(options).with_sources(sources);
    loader.load();
    let report = loader.take_report().unwrap_or_default();

    let builder = UserTreeBuilder::new(master.clone(), cli.subject());
    builder.build();
    let tree = master.snapshot();
    let user = builder.snapshot();

    if cli.json {
        match debug_report::to_json(&report, &tree, &user) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("error: failed to encode report: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        debug_report::print_load(&report, &tree, &user, cli.color());
    }

    if report.diagnostics.has_errors() { ExitCode::from(1) } else { ExitCode::SUCCESS }
}
