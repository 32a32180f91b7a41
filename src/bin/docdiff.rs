//! # docdiff CLI - Compare two versions of a document
//!
//! A command-line front end for the docdiff library.
//!
//! ## Features
//! - Summarize and list the differences between two text files
//! - Print one document with its changes highlighted
//! - Walk the differences the way a review UI does
//! - Inspect how a document is tokenized
//!
//! ## Usage
//! ```bash
//! # Summary and list of changes
//! docdiff compare lease-v1.txt lease-v2.txt
//!
//! # Only modifications, as JSON
//! docdiff compare lease-v1.txt lease-v2.txt --filter modifications --json
//!
//! # Highlight the revised document, marking the third change
//! docdiff render lease-v1.txt lease-v2.txt --side b --active 2
//!
//! # Step through the changes
//! docdiff navigate lease-v1.txt lease-v2.txt --steps next,next,prev
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use docdiff::{
    ChangeStatsProvider, ComparisonSession, Completion, DiffEngine, DiffEngineBuilder,
    DiffOptions, DifferenceKind, DocDiffError, DocumentSide, KindFilter, Run, TokenizerMode,
    UnifiedRun,
};
use humantime::format_duration;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// docdiff CLI - Token-level comparison of document versions
#[derive(Parser)]
#[command(name = "docdiff")]
#[command(version)]
#[command(about = "Compare two versions of a document and review the changes")]
#[command(long_about = None)]
struct Cli {
    /// JSON file with comparison options
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Tokenization policy (overrides the configuration file)
    #[arg(long, value_enum, global = true)]
    mode: Option<ModeArg>,

    /// Compare tokens case-insensitively
    #[arg(short, long, global = true)]
    ignore_case: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize and list the differences
    #[command(alias = "cmp")]
    Compare {
        /// Original document
        original: PathBuf,

        /// Revised document
        revised: PathBuf,

        /// Only show differences of this kind
        #[arg(short, long, value_enum, default_value = "all")]
        filter: FilterArg,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Show change statistics
        #[arg(long)]
        stats: bool,

        /// Show progress
        #[arg(long)]
        progress: bool,
    },

    /// Print one document with its differences highlighted
    Render {
        /// Original document
        original: PathBuf,

        /// Revised document
        revised: PathBuf,

        /// Document to print
        #[arg(short, long, value_enum, default_value = "b")]
        side: SideArg,

        /// Index of the difference to mark as active
        #[arg(short, long)]
        active: Option<usize>,

        /// Only highlight differences of this kind
        #[arg(short, long, value_enum, default_value = "all")]
        filter: FilterArg,

        /// Interleave removed text from the original with the revised document
        #[arg(short, long, conflicts_with = "side")]
        unified: bool,
    },

    /// Walk the filtered differences and print where each step lands
    #[command(alias = "nav")]
    Navigate {
        /// Original document
        original: PathBuf,

        /// Revised document
        revised: PathBuf,

        /// Steps to take, comma separated
        #[arg(short, long, value_enum, value_delimiter = ',', default_value = "next")]
        steps: Vec<Step>,

        /// Only visit differences of this kind
        #[arg(short, long, value_enum, default_value = "all")]
        filter: FilterArg,
    },

    /// Print the tokens of a document
    Tokens {
        /// Document to tokenize
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Split on whitespace only
    Whitespace,
    /// Also split leading and trailing punctuation
    Punctuation,
}

impl From<ModeArg> for TokenizerMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Whitespace => TokenizerMode::Whitespace,
            ModeArg::Punctuation => TokenizerMode::Punctuation,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Additions,
    Deletions,
    Modifications,
}

impl From<FilterArg> for KindFilter {
    fn from(filter: FilterArg) -> Self {
        match filter {
            FilterArg::All => KindFilter::All,
            FilterArg::Additions => KindFilter::Additions,
            FilterArg::Deletions => KindFilter::Deletions,
            FilterArg::Modifications => KindFilter::Modifications,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SideArg {
    A,
    B,
}

impl From<SideArg> for DocumentSide {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::A => DocumentSide::A,
            SideArg::B => DocumentSide::B,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Step {
    Next,
    Prev,
}

/// What `render` prints
#[derive(Clone, Copy)]
enum View {
    Side(DocumentSide),
    Unified,
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let default_level = if cli.verbose { "docdiff=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Disable colors if needed
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    // Run command
    if let Err(e) = run(cli) {
        let message = match e.downcast_ref::<DocDiffError>() {
            Some(err) if e.chain().count() == 1 => err.user_message(),
            _ => format!("{:#}", e),
        };
        eprintln!("{}: {}", "Error".red().bold(), message);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let engine = build_engine(&cli)?;

    match cli.command {
        Commands::Compare {
            original,
            revised,
            filter,
            json,
            stats,
            progress,
        } => cmd_compare(engine, &original, &revised, filter.into(), json, stats, progress),
        Commands::Render {
            original,
            revised,
            side,
            active,
            filter,
            unified,
        } => {
            let view = if unified { View::Unified } else { View::Side(side.into()) };
            cmd_render(engine, &original, &revised, view, active, filter.into())
        }
        Commands::Navigate {
            original,
            revised,
            steps,
            filter,
        } => cmd_navigate(engine, &original, &revised, &steps, filter.into()),
        Commands::Tokens { file } => cmd_tokens(&engine, &file),
    }
}

fn build_engine(cli: &Cli) -> Result<DiffEngine> {
    let options = match &cli.config {
        Some(path) => DiffOptions::from_json_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => DiffOptions::default(),
    };

    let mut builder = DiffEngineBuilder::new().options(options);
    if let Some(mode) = cli.mode {
        builder = builder.tokenizer(mode.into());
    }
    if cli.ignore_case {
        builder = builder.ignore_case(true);
    }
    Ok(builder.build()?)
}

fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Compare two files in a background session and wait for the result
fn open_session(
    engine: DiffEngine,
    original: &Path,
    revised: &Path,
    progress: bool,
) -> Result<(tokio::runtime::Runtime, ComparisonSession)> {
    let text_a = read_document(original)?;
    let text_b = read_document(revised)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let mut session = ComparisonSession::with_runtime(engine, runtime.handle().clone());

    let pb = if progress {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!(
            "Comparing {} with {}...",
            original.display(),
            revised.display()
        ));
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    } else {
        None
    };

    session.submit(text_a, text_b);
    let completion = runtime.block_on(session.wait());

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    match completion {
        Some(Completion::Applied) => Ok((runtime, session)),
        _ => match session.store().last_error() {
            Some(err) => Err(anyhow::anyhow!(err.user_message())),
            None => Err(anyhow::anyhow!("Comparison did not complete")),
        },
    }
}

fn cmd_compare(
    engine: DiffEngine,
    original: &Path,
    revised: &Path,
    filter: KindFilter,
    json: bool,
    stats: bool,
    progress: bool,
) -> Result<()> {
    let start = Instant::now();
    let (_runtime, mut session) = open_session(engine, original, revised, progress)?;
    session.set_filter(filter);
    let elapsed = start.elapsed();

    let store = session.store();
    let Some(list) = store.list() else {
        return Ok(());
    };

    if json {
        let mut output = serde_json::json!({
            "generation": list.generation,
            "summary": list.summary,
            "differences": store.filtered(),
        });
        if stats {
            output["stats"] = serde_json::to_value(session.analyze(&ChangeStatsProvider)?)?;
        }
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let summary = list.summary;
    println!("{}", "Comparison Summary".blue().bold());
    println!("  {} {}", "Original:".bold(), original.display());
    println!("  {} {}", "Revised:".bold(), revised.display());
    println!(
        "  {} {} ({} {}, {} {}, {} {})",
        "Differences:".bold(),
        summary.total,
        summary.additions.to_string().green(),
        "added".green(),
        summary.deletions.to_string().red(),
        "deleted".red(),
        summary.modifications.to_string().yellow(),
        "modified".yellow()
    );
    println!("  {} {}", "Time:".bold(), format_duration(round_millis(elapsed)));

    if summary.is_empty() {
        println!("\n{} Documents are identical", "✓".green().bold());
    } else {
        let filtered = store.filtered();
        if filtered.is_empty() {
            println!("\nNo differences match the filter");
        }
        for (i, difference) in filtered.iter().enumerate() {
            if i == 0 {
                println!();
            }
            println!(
                "  {:>4}. {} {}",
                i + 1,
                kind_label(difference.kind),
                difference.preview
            );
        }
    }

    if stats {
        if let Some(report) = session.analyze(&ChangeStatsProvider)? {
            println!("\n{}", "Change Statistics".blue().bold());
            println!(
                "  {} {} / {} ({} equal)",
                "Tokens:".bold(),
                report.stats.tokens_a,
                report.stats.tokens_b,
                report.stats.tokens_equal
            );
            println!("  {} {:.1}%", "Similarity:".bold(), report.similarity * 100.0);
            println!(
                "  {} {:.1}% of original, {:.1}% of revised",
                "Changed:".bold(),
                report.changed_ratio_a * 100.0,
                report.changed_ratio_b * 100.0
            );
            if let Some(largest) = report.largest {
                println!("  {} {}", "Largest:".bold(), largest.preview);
            }
        }
    }

    Ok(())
}

fn cmd_render(
    engine: DiffEngine,
    original: &Path,
    revised: &Path,
    view: View,
    active: Option<usize>,
    filter: KindFilter,
) -> Result<()> {
    let (_runtime, mut session) = open_session(engine, original, revised, false)?;
    session.set_filter(filter);
    if let Some(index) = active {
        if !session.select(index) {
            anyhow::bail!(
                "No difference at index {} ({} match the filter)",
                index,
                session.store().filtered().len()
            );
        }
    }

    let mut out = String::new();
    match view {
        View::Side(side) => {
            for run in &session.render(side)? {
                out.push_str(&paint(run).to_string());
            }
        }
        View::Unified => {
            for run in &session.render_unified()? {
                out.push_str(&paint_unified(run));
            }
        }
    }
    print!("{}", out);
    if !out.ends_with('\n') {
        println!();
    }
    Ok(())
}

fn cmd_navigate(
    engine: DiffEngine,
    original: &Path,
    revised: &Path,
    steps: &[Step],
    filter: KindFilter,
) -> Result<()> {
    let (_runtime, mut session) = open_session(engine, original, revised, false)?;
    session.set_filter(filter);

    if session.store().current().is_none() {
        println!("No differences match the filter");
        return Ok(());
    }

    print_position(&session);
    for step in steps {
        match step {
            Step::Next => session.next(),
            Step::Prev => session.previous(),
        }
        print_position(&session);
    }
    Ok(())
}

fn print_position(session: &ComparisonSession) {
    let store = session.store();
    if let (Some((position, total)), Some(difference)) = (store.position(), store.current()) {
        println!(
            "[{}/{}] {} {} {}",
            position,
            total,
            kind_label(difference.kind),
            format!("@{}", difference.position()).dimmed(),
            difference.preview
        );
    }
}

fn cmd_tokens(engine: &DiffEngine, file: &Path) -> Result<()> {
    let text = read_document(file)?;
    let tokens = engine.tokenize(&text);
    for token in &tokens {
        println!(
            "{:>8}..{:<8} {}",
            token.start,
            token.end,
            token.text.cyan()
        );
    }
    println!("\n{} {} tokens", "✓".green().bold(), tokens.len());
    Ok(())
}

fn kind_label(kind: DifferenceKind) -> ColoredString {
    match kind {
        DifferenceKind::Addition => "+ added   ".green().bold(),
        DifferenceKind::Deletion => "- deleted ".red().bold(),
        DifferenceKind::Modification => "~ modified".yellow().bold(),
    }
}

fn paint(run: &Run<'_>) -> ColoredString {
    let Some(highlight) = run.highlight else {
        return run.text.normal();
    };
    let painted = match highlight.kind {
        DifferenceKind::Addition => run.text.green().underline(),
        DifferenceKind::Deletion => run.text.red().strikethrough(),
        DifferenceKind::Modification => run.text.yellow(),
    };
    if highlight.active {
        painted.bold().reversed()
    } else {
        painted
    }
}

/// Unified runs keep their color, with word-diff markers when color is off
fn paint_unified(run: &UnifiedRun<'_>) -> String {
    let plain = Run {
        text: run.text,
        highlight: run.highlight.map(|mut h| {
            if run.side == DocumentSide::A {
                h.kind = DifferenceKind::Deletion;
            } else if h.kind == DifferenceKind::Modification {
                h.kind = DifferenceKind::Addition;
            }
            h
        }),
    };
    let painted = paint(&plain).to_string();
    match (run.highlight, colored::control::SHOULD_COLORIZE.should_colorize()) {
        (Some(_), false) if run.side == DocumentSide::A => format!("[-{}-]", painted),
        (Some(_), false) => format!("{{+{}+}}", painted),
        _ => painted,
    }
}

fn round_millis(elapsed: Duration) -> Duration {
    Duration::from_millis(elapsed.as_millis() as u64)
}
