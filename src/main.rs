use anyhow::{bail, Result};
use backup_rotator::classify::select;
use backup_rotator::link::rebuild_links;
use backup_rotator::policy::RetentionPolicy;
use backup_rotator::prune::prune_source;
use backup_rotator::scan::{scan_source, DEFAULT_SUFFIX};
use clap::Parser;
use colored::Colorize;
use humansize::{format_size, BINARY};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Rotate timestamped backups: keep the newest plus daily/weekly/monthly/yearly generations",
    long_about = None
)]
struct Args {
    /// Directory containing the timestamped backup files
    #[arg(long, short)]
    source: PathBuf,

    /// Directory for the farm of retention symlinks (rebuilt every run)
    #[arg(long, short)]
    destination: PathBuf,

    /// Number of most recent backups to keep unconditionally
    #[arg(long, default_value_t = 5)]
    keep: usize,

    /// Number of daily generations to keep
    #[arg(long, default_value_t = 7)]
    keep_days: usize,

    /// Number of weekly generations to keep
    #[arg(long, default_value_t = 5)]
    keep_weeks: usize,

    /// Number of monthly generations to keep
    #[arg(long, default_value_t = 6)]
    keep_months: usize,

    /// Number of yearly generations to keep
    #[arg(long, default_value_t = 2)]
    keep_years: usize,

    /// Filename suffix expected immediately after the timestamp
    #[arg(long, default_value = DEFAULT_SUFFIX)]
    suffix: String,

    /// Report removals without deleting anything (links are still rebuilt)
    #[arg(long)]
    dry_run: bool,

    /// Show per-file decisions while running
    #[arg(long, short)]
    verbose: bool,
}

fn run(args: &Args) -> Result<()> {
    // Validate configuration before touching either directory.
    if !args.source.is_dir() {
        bail!("source {} is not a directory", args.source.display());
    }
    if !args.destination.is_dir() {
        bail!("destination {} is not a directory", args.destination.display());
    }

    if args.dry_run {
        println!("Dry run enabled: no backups will be deleted");
    }

    let policy = RetentionPolicy {
        keep: args.keep,
        days: args.keep_days,
        weeks: args.keep_weeks,
        months: args.keep_months,
        years: args.keep_years,
    };

    let found = scan_source(&args.source, &args.suffix)?;
    if found.is_empty() {
        bail!("no backup files found in {}", args.source.display());
    }
    if args.verbose {
        println!("Found {} backup files in {}", found.len(), args.source.display());
    }

    let selection = select(&found, &policy);

    // Relink first, then prune: the farm always reflects the selection
    // about to be enforced.
    let linked = rebuild_links(&args.destination, &args.source, &selection)?;
    let report = prune_source(&args.source, &found, &selection, args.dry_run);

    for file in selection.files() {
        let tags: Vec<&str> = file.tags.iter().map(|t| t.as_str()).collect();
        println!("{} [{}]", file.name, tags.join(", ").green());
    }

    println!(
        "{}",
        format!("{} backups selected, {} links created", selection.len(), linked).bold()
    );
    if args.dry_run {
        println!("Dry run mode: no files were deleted.");
    } else {
        println!(
            "{} backups removed, {} reclaimed",
            report.removed,
            format_size(report.reclaimed_bytes, BINARY)
        );
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    run(&args)
}
