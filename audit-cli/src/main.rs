mod cli;
mod prompts;
mod shell;

use anyhow::{Context, Result};
use clap::Parser;
use colored::{ColoredString, Colorize};
use std::fs;
use std::path::{Path, PathBuf};

use audit_core::{
    chart_series, compute_per_project_breakdown, compute_request_counts_by_project, compute_stats,
    deadline_tag, decode_data_uri, export_fulfilled_csv, export_snapshot_json, load_snapshot,
    AuditStore, DeadlineStatus, EvidenceValidity, LinkedEvidence, Request, RequestStatus,
    Settings, StoreError,
};

use crate::cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut settings = Settings::load_default()?;
    if let Some(days) = cli.warning_days {
        settings.set_warning_days(days)?;
    }

    let store = open_store(cli.seed.as_deref().or(settings.seed_path.as_deref()))?;

    match cli.command.unwrap_or(Command::Shell) {
        Command::Dashboard => print_dashboard(&store, settings.warning_days),
        Command::List { project } => print_requests(&store, settings.warning_days, project.as_deref())?,
        Command::Evidence => print_evidence(&store),
        Command::Export { output } => {
            let dir = output
                .or_else(|| settings.export_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            export_csv(&store, &dir)?;
        }
        Command::ExportJson { output } => {
            export_snapshot_json(&store.snapshot(), &output)?;
            println!("{} {}", "Exported to JSON:".green(), output.display());
        }
        Command::Attachment { id, output } => save_attachment(&store, &id, &output)?,
        Command::Shell => shell::run(store, settings)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Builds the store from the seed file, or empty when there is none
fn open_store(seed: Option<&Path>) -> Result<AuditStore> {
    match seed {
        Some(path) => {
            log::debug!("Seeding store from {:?}", path);
            Ok(AuditStore::from_snapshot(load_snapshot(path)?))
        }
        None => {
            log::debug!("No seed configured, starting empty");
            Ok(AuditStore::new())
        }
    }
}

// =========================================================================
// Dashboard
// =========================================================================

pub(crate) fn print_dashboard(store: &AuditStore, warning_days: i64) {
    let stats = compute_stats(store.requests(), warning_days);

    println!("{}", "Dashboard".bold());
    println!("{}", "-".repeat(60));
    println!("{:<28} {}", "Total Permintaan".blue(), stats.total);
    println!("{:<28} {}", "Terpenuhi".green(), stats.fulfilled);
    println!(
        "{:<28} {}",
        format!("Mendekati Tenggat (≤{} hari)", warning_days).yellow(),
        stats.approaching_deadline
    );
    println!("{:<28} {}", "Terlambat".red(), stats.overdue);
    println!();
    println!(
        "{} {}%  {}",
        "Tingkat Pemenuhan".bold(),
        stats.fulfillment_percentage,
        progress_bar(stats.fulfillment_percentage, 30)
    );
    println!(
        "{} dari {} total permintaan telah terpenuhi.",
        stats.fulfilled, stats.total
    );

    let breakdown = compute_per_project_breakdown(store.requests(), store.projects());
    let series = chart_series(&breakdown);
    if !series.is_empty() {
        println!();
        println!("{}", "Status per Proyek Audit".bold());
        for entry in series {
            println!(
                "  {:<40} {} {:<4} {} {}",
                entry.project_name,
                "Belum".blue(),
                entry.pending,
                "Terpenuhi".magenta(),
                entry.fulfilled
            );
        }
    }

    let counts = compute_request_counts_by_project(store.requests(), store.projects());
    if !counts.is_empty() {
        let max = counts.iter().map(|c| c.count).max().unwrap_or(1);
        println!();
        println!("{}", "Jumlah Permintaan per Proyek Audit".bold());
        for entry in counts {
            let width = (entry.count * 30).div_ceil(max);
            println!("  {:<40} {} {}", entry.name, "█".repeat(width).cyan(), entry.count);
        }
    }
}

fn progress_bar(percentage: u32, width: usize) -> String {
    let filled = (percentage.min(100) as usize * width) / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

// =========================================================================
// Listings
// =========================================================================

pub(crate) fn print_requests(store: &AuditStore, warning_days: i64, only: Option<&str>) -> Result<()> {
    if store.projects().is_empty() {
        println!("{}", "Belum ada proyek audit. Tambahkan proyek terlebih dahulu.".yellow());
        return Ok(());
    }

    let projects: Vec<_> = match only {
        Some(id) => vec![store
            .get_project(id)
            .with_context(|| format!("Project not found: {}", id))?],
        None => store.projects().iter().collect(),
    };

    for project in projects {
        let requests: Vec<&Request> = store.requests_for_project(&project.id).collect();
        println!(
            "\n{} {} ({} permintaan)",
            project.id.cyan(),
            project.name.bold(),
            requests.len()
        );

        if requests.is_empty() {
            println!("  {}", "Belum ada permintaan untuk proyek ini.".dimmed());
            continue;
        }

        println!(
            "  {:<8} | {:<10} | {:<12} | {:<30} | {:<10} | {:<18} | {:<10} | {:<20} | {:<9} | {:<10}",
            "ID", "Tanggal", "Unit", "Deskripsi", "Tenggat", "Sisa Hari", "PIC", "Bukti Terkait", "Status", "Pemenuhan"
        );
        println!("  {}", "-".repeat(170));

        for req in requests {
            let tag = deadline_tag(req, warning_days)
                .map(|d| color_deadline(&d.label, d.status))
                .unwrap_or_else(|| "-".normal());
            let bukti = store
                .linked_evidence(req)
                .iter()
                .map(|link| match link {
                    LinkedEvidence::Found(ev) => ev.id.clone(),
                    LinkedEvidence::Missing(id) => format!("{}?", id),
                })
                .collect::<Vec<_>>()
                .join(", ");

            println!(
                "  {:<8} | {:<10} | {:<12} | {:<30} | {:<10} | {:<18} | {:<10} | {:<20} | {:<9} | {:<10}",
                req.id,
                req.tanggal.to_string(),
                truncate(&req.unit, 12),
                truncate(&req.deskripsi, 30),
                req.tenggat.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                tag,
                req.pic.as_deref().unwrap_or("-"),
                if bukti.is_empty() { "-".to_string() } else { bukti },
                color_status(req.status),
                req.pemenuhan.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
            );
        }
    }

    Ok(())
}

pub(crate) fn print_evidence(store: &AuditStore) {
    if store.evidence().is_empty() {
        println!("{}", "Bank bukti masih kosong.".yellow());
        return;
    }

    println!(
        "{:<8} | {:<16} | {:<30} | {:<12} | {:<10} | {:<10} | {:<15} | {:<9} | {}",
        "ID", "Kategori", "Deskripsi", "Unit", "PIC", "Diterima", "Validitas", "PRM", "Bukti"
    );
    println!("{}", "-".repeat(140));

    for ev in store.evidence() {
        let validity = match ev.validitas {
            EvidenceValidity::Valid => ev.validitas.to_string().green(),
            EvidenceValidity::NeedsImprovement => ev.validitas.to_string().yellow(),
        };
        let source = if ev.has_attachment() {
            format!("Unduh File ({})", ev.filename.as_deref().unwrap_or_default())
        } else {
            format!("Buka Link ({})", ev.link)
        };

        println!(
            "{:<8} | {:<16} | {:<30} | {:<12} | {:<10} | {:<10} | {:<15} | {:<9} | {}",
            ev.id,
            truncate(&ev.kategori, 16),
            truncate(&ev.deskripsi, 30),
            truncate(&ev.unit, 12),
            ev.pic.as_deref().unwrap_or("-"),
            ev.tgl_diterima.to_string(),
            validity,
            ev.prm_terkait.as_deref().unwrap_or("-"),
            source
        );
        if let Some(note) = &ev.catatan {
            println!("{:<8}   {} {}", "", "Catatan:".dimmed(), note);
        }
    }
}

fn color_status(status: RequestStatus) -> ColoredString {
    match status {
        RequestStatus::Pending => status.to_string().blue(),
        RequestStatus::Fulfilled => status.to_string().green(),
    }
}

fn color_deadline(label: &str, status: DeadlineStatus) -> ColoredString {
    match status {
        DeadlineStatus::Overdue => label.red(),
        DeadlineStatus::Deadline => label.bright_red(),
        DeadlineStatus::Warning => label.yellow(),
        DeadlineStatus::Ok => label.normal(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut)
}

// =========================================================================
// Files
// =========================================================================

pub(crate) fn export_csv(store: &AuditStore, dir: &Path) -> Result<()> {
    match export_fulfilled_csv(store.requests()) {
        Ok(export) => {
            let path = export.write_to_dir(dir)?;
            println!(
                "{} {} ({} permintaan, {})",
                "Exported:".green(),
                path.display(),
                export.rows,
                export.mime_type
            );
            Ok(())
        }
        Err(StoreError::EmptyExport) => {
            println!("{}", StoreError::EmptyExport.to_string().yellow());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn save_attachment(store: &AuditStore, id: &str, dir: &Path) -> Result<()> {
    let ev = store
        .get_evidence(id)
        .with_context(|| format!("Evidence not found: {}", id))?;

    let Some((_, bytes)) = decode_data_uri(&ev.link) else {
        anyhow::bail!("{} has no attached file; its link is {}", id, ev.link);
    };
    let filename = ev.filename.clone().unwrap_or_else(|| format!("{}.bin", ev.id));

    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    fs::write(&path, bytes).with_context(|| format!("Failed to write {:?}", path))?;
    println!("{} {}", "Saved:".green(), path.display());
    Ok(())
}
