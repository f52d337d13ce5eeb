//! Interactive session
//!
//! The store lives only for the duration of the session. Every action reads
//! the current state, calls a single store operation and reports the
//! outcome; store errors are shown and the session carries on.

use anyhow::Result;
use colored::Colorize;
use inquire::{InquireError, Select};
use std::fmt;
use std::path::PathBuf;

use audit_core::{get_config_path, AuditStore, Settings, StoreError};

use crate::prompts;
use crate::{export_csv, print_dashboard, print_evidence, print_requests};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Dashboard,
    ListRequests,
    ListEvidence,
    AddProject,
    EditProject,
    DeleteProject,
    AddRequest,
    EditRequest,
    DeleteRequest,
    AddEvidence,
    EditEvidence,
    DeleteEvidence,
    SetWarningDays,
    ExportCsv,
    Quit,
}

impl Action {
    const ALL: [Action; 15] = [
        Action::Dashboard,
        Action::ListRequests,
        Action::ListEvidence,
        Action::AddProject,
        Action::EditProject,
        Action::DeleteProject,
        Action::AddRequest,
        Action::EditRequest,
        Action::DeleteRequest,
        Action::AddEvidence,
        Action::EditEvidence,
        Action::DeleteEvidence,
        Action::SetWarningDays,
        Action::ExportCsv,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Dashboard => "Dashboard",
            Action::ListRequests => "Daftar Permintaan",
            Action::ListEvidence => "Bank Bukti",
            Action::AddProject => "Tambah Proyek Audit",
            Action::EditProject => "Ubah Proyek Audit",
            Action::DeleteProject => "Hapus Proyek Audit",
            Action::AddRequest => "Tambah Permintaan",
            Action::EditRequest => "Ubah Permintaan",
            Action::DeleteRequest => "Hapus Permintaan",
            Action::AddEvidence => "Tambah Bukti",
            Action::EditEvidence => "Ubah Bukti",
            Action::DeleteEvidence => "Hapus Bukti",
            Action::SetWarningDays => "Batas Peringatan",
            Action::ExportCsv => "Download Terpenuhi",
            Action::Quit => "Keluar",
        };
        write!(f, "{}", label)
    }
}

/// Runs the menu loop until the user quits or presses Esc/Ctrl-C at the menu
pub fn run(mut store: AuditStore, mut settings: Settings) -> Result<()> {
    println!(
        "{} ({} proyek, {} permintaan, {} bukti; batas peringatan {} hari)",
        "Audit Tracker".bold(),
        store.projects().len(),
        store.requests().len(),
        store.evidence().len(),
        settings.warning_days
    );

    loop {
        println!();
        let action = match Select::new("Menu:", Action::ALL.to_vec())
            .with_page_size(Action::ALL.len())
            .prompt()
        {
            Ok(action) => action,
            Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        if action == Action::Quit {
            break;
        }

        match perform(action, &mut store, &mut settings) {
            Ok(()) => {}
            // Cancelling a form only abandons that form
            Err(e) if is_cancel(&e) => println!("{}", "Dibatalkan.".dimmed()),
            Err(e) => match e.downcast_ref::<StoreError>() {
                Some(store_err) => println!("{} {}", "Error:".red().bold(), store_err),
                None => return Err(e),
            },
        }
    }

    println!("{}", "Data sesi ini tidak disimpan.".dimmed());
    Ok(())
}

fn is_cancel(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<InquireError>(),
        Some(InquireError::OperationCanceled) | Some(InquireError::OperationInterrupted)
    )
}

fn perform(action: Action, store: &mut AuditStore, settings: &mut Settings) -> Result<()> {
    match action {
        Action::Dashboard => print_dashboard(store, settings.warning_days),
        Action::ListRequests => print_requests(store, settings.warning_days, None)?,
        Action::ListEvidence => print_evidence(store),

        Action::AddProject => {
            let name = prompts::prompt_project_name(None)?;
            let project = store.create_project(&name)?;
            println!("{} {}", "Proyek ditambahkan:".green(), project.id);
        }
        Action::EditProject => {
            let Some(id) = prompts::select_project(store, "Proyek:")? else {
                return nothing("proyek");
            };
            let current = store.get_project(&id).map(|p| p.name.clone());
            let name = prompts::prompt_project_name(current.as_deref())?;
            store.update_project(&id, &name)?;
            println!("{}", "Proyek diperbarui.".green());
        }
        Action::DeleteProject => {
            let Some(id) = prompts::select_project(store, "Proyek:")? else {
                return nothing("proyek");
            };
            let affected = store.requests_for_project(&id).count();
            let message = format!(
                "Yakin ingin menghapus proyek ini? SEMUA permintaan terkait ({}) akan dihapus.",
                affected
            );
            if prompts::confirm(&message)? {
                store.delete_project(&id)?;
                println!("{}", "Proyek dihapus.".green());
            }
        }

        Action::AddRequest => {
            let Some(project_id) = prompts::select_project(store, "Tambah permintaan ke proyek:")? else {
                return nothing("proyek");
            };
            let draft = prompts::prompt_new_request(store)?;
            let request = store.create_request(draft, &project_id)?;
            println!(
                "{} {} ({})",
                "Permintaan ditambahkan:".green(),
                request.id,
                request.status
            );
        }
        Action::EditRequest => {
            let Some(id) = prompts::select_request(store, "Permintaan:")? else {
                return nothing("permintaan");
            };
            let Some(current) = store.get_request(&id).cloned() else {
                return nothing("permintaan");
            };
            let edited = prompts::prompt_edit_request(store, &current)?;
            let stored = store.update_request(edited)?;
            println!("{} {} ({})", "Permintaan diperbarui:".green(), stored.id, stored.status);
        }
        Action::DeleteRequest => {
            let Some(id) = prompts::select_request(store, "Permintaan:")? else {
                return nothing("permintaan");
            };
            if prompts::confirm(&format!("Yakin ingin menghapus permintaan {}?", id))? {
                store.delete_request(&id)?;
                println!("{}", "Permintaan dihapus.".green());
            }
        }

        Action::AddEvidence => {
            let draft = prompts::prompt_new_evidence(store)?;
            let evidence = store.create_evidence(draft)?;
            println!("{} {}", "Bukti ditambahkan:".green(), evidence.id);
        }
        Action::EditEvidence => {
            let Some(id) = prompts::select_evidence(store, "Bukti:")? else {
                return nothing("bukti");
            };
            let Some(current) = store.get_evidence(&id).cloned() else {
                return nothing("bukti");
            };
            let edited = prompts::prompt_edit_evidence(store, &current)?;
            store.update_evidence(edited)?;
            println!("{}", "Bukti diperbarui.".green());
        }
        Action::DeleteEvidence => {
            let Some(id) = prompts::select_evidence(store, "Bukti:")? else {
                return nothing("bukti");
            };
            if prompts::confirm(&format!("Yakin ingin menghapus bukti {}?", id))? {
                store.delete_evidence(&id)?;
                println!("{}", "Bukti dihapus.".green());
            }
        }

        Action::SetWarningDays => {
            let days = prompts::prompt_warning_days(settings.warning_days)?;
            settings.set_warning_days(days)?;
            if prompts::confirm("Simpan batas peringatan ke file konfigurasi?")? {
                let path = get_config_path()?;
                settings.save(&path)?;
                println!("{} {}", "Disimpan:".green(), path.display());
            }
        }
        Action::ExportCsv => {
            let dir = settings
                .export_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("."));
            export_csv(store, &dir)?;
        }
        Action::Quit => {}
    }

    Ok(())
}

fn nothing(what: &str) -> Result<()> {
    println!("{}", format!("Belum ada {}.", what).yellow());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_ends_with_quit() {
        assert_eq!(Action::ALL.last(), Some(&Action::Quit));
        assert_eq!(Action::ExportCsv.to_string(), "Download Terpenuhi");
    }

    #[test]
    fn test_cancel_detection() {
        let e: anyhow::Error = InquireError::OperationCanceled.into();
        assert!(is_cancel(&e));
        let e: anyhow::Error = StoreError::EmptyExport.into();
        assert!(!is_cancel(&e));
    }
}
