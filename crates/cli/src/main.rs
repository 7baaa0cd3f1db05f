use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use drive_mime_repair_core::{
    acquire_session, prefilter_entries, run_repair, scan_catalog, DriveClient, ListQuery,
    RemoteEntry, RepairOptions, RepairSummary, DEFAULT_PAGE_SIZE,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "drive-mime-repair",
    version,
    about = "Find Drive files stored as generic binaries and re-copy them with the correct content type."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List repair candidates without touching anything.
    Scan(ScanArgs),
    /// Copy candidates with corrected types and trash the originals.
    Repair(RepairArgs),
}

#[derive(Debug, Args)]
struct ScanArgs {
    /// Stored OAuth token file.
    #[arg(long, default_value = "token.json", value_name = "FILE")]
    token: PathBuf,

    /// Page size hint for catalog listing.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Optional JSON output file for the candidate list.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RepairArgs {
    /// Stored OAuth token file.
    #[arg(long, default_value = "token.json", value_name = "FILE")]
    token: PathBuf,

    /// Page size hint for catalog listing.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Report what would be repaired without issuing any mutation.
    #[arg(long)]
    dry_run: bool,

    /// Optional JSON output file for the repair summary.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ScanReport {
    scanned: usize,
    eligible: usize,
    candidates: Vec<RemoteEntry>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => run_scan_command(args),
        Commands::Repair(args) => run_repair_command(args),
    }
}

fn run_scan_command(args: ScanArgs) -> Result<()> {
    let session = acquire_session(&args.token)?;
    let client = DriveClient::new(session).context("failed to build Drive client")?;
    let options = RepairOptions::default();

    let catalog = scan_catalog(&client, &ListQuery::untyped_binaries(args.page_size));
    let scanned = catalog.len();
    let candidates = prefilter_entries(catalog, &options);

    if candidates.is_empty() {
        println!("No repair candidates found ({} generic-binary entries scanned).", scanned);
    } else {
        println!("Repair candidates ({} of {} scanned):", candidates.len(), scanned);
        for entry in &candidates {
            println!(
                "- {} ({}) ext={} size={}",
                entry.name,
                entry.id,
                entry.file_extension.as_deref().unwrap_or("-"),
                human_bytes(entry.size)
            );
        }
    }

    if let Some(output) = args.output {
        let report = ScanReport {
            scanned,
            eligible: candidates.len(),
            candidates,
        };
        let payload =
            serde_json::to_string_pretty(&report).context("failed to serialize scan report")?;
        fs::write(&output, payload)
            .with_context(|| format!("failed to write scan report to {}", output.display()))?;
        println!("Scan report written to {}", output.display());
    }

    Ok(())
}

fn run_repair_command(args: RepairArgs) -> Result<()> {
    let session = acquire_session(&args.token)?;
    let client = DriveClient::new(session).context("failed to build Drive client")?;
    let options = RepairOptions {
        dry_run: args.dry_run,
        ..RepairOptions::default()
    };

    let catalog = scan_catalog(&client, &ListQuery::untyped_binaries(args.page_size));
    let candidates = prefilter_entries(catalog, &options);
    let summary = run_repair(&client, &candidates, &options);

    print_summary(&summary, args.dry_run);

    if let Some(output) = args.output {
        let payload =
            serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
        fs::write(&output, payload)
            .with_context(|| format!("failed to write summary to {}", output.display()))?;
        println!("Summary written to {}", output.display());
    }

    Ok(())
}

fn print_summary(summary: &RepairSummary, dry_run: bool) {
    if dry_run {
        println!(
            "Dry run: would correct {} out of {}.",
            summary.corrected, summary.considered
        );
    } else {
        println!(
            "Corrected {} out of {}.",
            summary.corrected, summary.considered
        );
    }
    if summary.skipped() > 0 {
        println!(
            "Skipped {} (unknown extension: {}, generic mapping: {}, too large: {}).",
            summary.skipped(),
            summary.skipped_unknown_extension,
            summary.skipped_generic_mapping,
            summary.skipped_too_large
        );
    }
    if summary.failed_copies > 0 {
        println!("Copy failures: {}.", summary.failed_copies);
    }
    if summary.failed_trash_updates > 0 {
        println!(
            "Originals left untrashed after a successful copy: {}.",
            summary.failed_trash_updates
        );
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn human_bytes(value: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if value == 0 {
        return "0 B".to_string();
    }
    let mut size = value as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}
