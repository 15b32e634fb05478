use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use livespan::config::{default_document, load_from_path, FormatConfig, CONFIG_FILE_NAME};
use livespan::engine::{Change, FormatOutput, Formatter};
use livespan::output::{atomic_write, write_formatted};
use livespan::report::ReporterKind;
use livespan::rules::RuleRegistry;
use rayon::prelude::*;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "livespan")]
#[command(about = "Formatter for Swift type syntax", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Format Swift files in place
    Format {
        /// Files or directories to format
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Configuration file (defaults to ./livespan.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report changes without writing; exit non-zero if any file would change
        #[arg(long)]
        lint: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Machine-readable report format
        #[arg(long, value_enum)]
        reporter: Option<ReporterKind>,

        /// Write the report to a file instead of stdout
        #[arg(long, requires = "reporter")]
        report: Option<PathBuf>,
    },

    /// List available rules
    Rules,

    /// Write a default configuration file
    Init {
        /// Destination (defaults to ./livespan.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

struct FormatArgs {
    paths: Vec<PathBuf>,
    config: Option<PathBuf>,
    lint: bool,
    diff: bool,
    reporter: Option<ReporterKind>,
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let registry = RuleRegistry::builtin();

    match cli.command {
        Commands::Format {
            paths,
            config,
            lint,
            diff,
            reporter,
            report,
        } => cmd_format(
            &registry,
            FormatArgs {
                paths,
                config,
                lint,
                diff,
                reporter,
                report,
            },
        ),

        Commands::Rules => cmd_rules(&registry),

        Commands::Init { path, force } => cmd_init(&registry, path, force),
    }
}

/// Install a subscriber only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        let filter = EnvFilter::from_default_env();
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    }
}

/// Explicit `--config`, else `./livespan.toml` if present, else defaults.
fn resolve_config(explicit: Option<&Path>) -> Result<FormatConfig> {
    if let Some(path) = explicit {
        return Ok(load_from_path(path)?);
    }
    let local = Path::new(CONFIG_FILE_NAME);
    if local.is_file() {
        debug!(path = %local.display(), "using local config");
        return Ok(load_from_path(local)?);
    }
    Ok(FormatConfig::default())
}

/// Every `.swift` file under `paths`, sorted, minus excluded prefixes.
fn collect_swift_files(paths: &[PathBuf], config: &FormatConfig) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in paths {
        if !root.exists() {
            bail!("No such file or directory: {}", root.display());
        }
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|s| s.to_str()) != Some("swift")
            {
                continue;
            }
            if config.is_excluded(path) {
                debug!(path = %path.display(), "excluded");
                continue;
            }
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn format_file(formatter: &Formatter<'_>, path: &Path) -> Result<FormatOutput> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(formatter.format(path, &source)?)
}

fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (formatted)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_format(registry: &RuleRegistry, args: FormatArgs) -> Result<()> {
    let config = resolve_config(args.config.as_deref())?;
    let formatter = Formatter::new(registry, &config)?;
    let files = collect_swift_files(&args.paths, &config)?;

    // a report on stdout must not be interleaved with progress lines
    let report_on_stdout = args.reporter.is_some() && args.report.is_none();
    let say = |line: String| {
        if report_on_stdout {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    };

    let results: Vec<(PathBuf, Result<FormatOutput>)> = files
        .par_iter()
        .map(|path| (path.clone(), format_file(&formatter, path)))
        .collect();

    let mut changes: Vec<Change> = Vec::new();
    let mut changed = 0usize;
    let mut unchanged = 0usize;
    let mut failed = 0usize;

    for (path, result) in results {
        let output = match result {
            Ok(output) => output,
            Err(e) => {
                eprintln!("{} {}: {:#}", "✗".red(), path.display(), e);
                failed += 1;
                continue;
            }
        };

        if !output.is_changed() {
            unchanged += 1;
            continue;
        }
        changed += 1;

        if args.diff && !report_on_stdout {
            display_diff(&path, &output.source, &output.output);
        }

        if args.lint {
            say(format!(
                "{} {}: {} change(s)",
                "⊙".yellow(),
                path.display(),
                output.changes.len()
            ));
        } else {
            match write_formatted(&output) {
                Ok(_) => say(format!("{} {}", "✓".green(), path.display())),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipped write");
                    eprintln!("{} {}: {}", "✗".red(), path.display(), e);
                    failed += 1;
                }
            }
        }
        changes.extend(output.changes);
    }

    if let Some(kind) = args.reporter {
        let rendered = kind.reporter().render(&changes)?;
        match &args.report {
            Some(report_path) => atomic_write(report_path, rendered.as_bytes())
                .with_context(|| format!("failed to write report {}", report_path.display()))?,
            None => print!("{rendered}"),
        }
    }

    let verb = if args.lint { "would change" } else { "formatted" };
    say(String::new());
    say(format!("{}", "Summary:".bold()));
    say(format!("  {} {}", format!("{changed}").green(), verb));
    say(format!("  {} unchanged", format!("{unchanged}").cyan()));
    say(format!("  {} failed", format!("{failed}").red()));

    if failed > 0 {
        bail!("{failed} file(s) failed");
    }
    if args.lint && changed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_rules(registry: &RuleRegistry) -> Result<()> {
    let width = registry.names().map(str::len).max().unwrap_or(0);
    for rule in registry.iter() {
        println!(
            "{}  {}",
            format!("{:width$}", rule.name()).bold(),
            rule.help().dimmed()
        );
    }
    Ok(())
}

fn cmd_init(registry: &RuleRegistry, path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    let document = default_document(registry);
    atomic_write(&path, document.to_string().as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("{} wrote {}", "✓".green(), path.display());
    Ok(())
}
