use anyhow::Result;
use chrono::NaiveDate;
use inquire::{Confirm, CustomType, MultiSelect, Select, Text};
use std::fmt;
use std::path::PathBuf;

use audit_core::{
    today, Attachment, AuditStore, Evidence, EvidenceDraft, EvidenceValidity, Request,
    RequestDraft, RequestStatus,
};

/// A selectable entity shown as "ID - label"
#[derive(Debug, Clone)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} - {}", self.id, self.label)
        }
    }
}

const NO_LINK: &str = "-";

/// Prompts for a project name, prefilled when editing
pub fn prompt_project_name(current: Option<&str>) -> Result<String> {
    let mut prompt = Text::new("Nama Proyek Audit:")
        .with_placeholder("cth: Audit BPK Semester II 2025");
    if let Some(name) = current {
        prompt = prompt.with_initial_value(name);
    }
    Ok(prompt.prompt()?)
}

pub fn select_project(store: &AuditStore, message: &str) -> Result<Option<String>> {
    let choices: Vec<Choice> = store
        .projects()
        .iter()
        .map(|p| Choice {
            id: p.id.clone(),
            label: p.name.clone(),
        })
        .collect();
    select_choice(message, choices)
}

pub fn select_request(store: &AuditStore, message: &str) -> Result<Option<String>> {
    let choices: Vec<Choice> = store
        .requests()
        .iter()
        .map(|r| Choice {
            id: r.id.clone(),
            label: r.deskripsi.clone(),
        })
        .collect();
    select_choice(message, choices)
}

pub fn select_evidence(store: &AuditStore, message: &str) -> Result<Option<String>> {
    let choices: Vec<Choice> = store
        .evidence()
        .iter()
        .map(|e| Choice {
            id: e.id.clone(),
            label: e.deskripsi.clone(),
        })
        .collect();
    select_choice(message, choices)
}

fn select_choice(message: &str, choices: Vec<Choice>) -> Result<Option<String>> {
    if choices.is_empty() {
        return Ok(None);
    }
    let choice = Select::new(message, choices).prompt()?;
    Ok(Some(choice.id))
}

/// Asks before a destructive action
pub fn confirm(message: &str) -> Result<bool> {
    Ok(Confirm::new(message).with_default(false).prompt()?)
}

pub fn prompt_warning_days(current: i64) -> Result<i64> {
    Ok(CustomType::<i64>::new("Batas Peringatan (hari):")
        .with_default(current)
        .with_error_message("Masukkan bilangan bulat")
        .prompt()?)
}

// =========================================================================
// Requests
// =========================================================================

/// Prompts for a new request
pub fn prompt_new_request(store: &AuditStore) -> Result<RequestDraft> {
    let unit = Text::new("Unit:").prompt()?;
    let deskripsi = Text::new("Deskripsi:").prompt()?;
    let mut draft = RequestDraft::new(unit, deskripsi);

    draft.tanggal = prompt_date("Tanggal:", Some(draft.tanggal))?.unwrap_or_else(today);
    draft.tenggat = prompt_date("Tenggat (kosongkan jika tidak ada):", None)?;
    draft.pic = prompt_optional("PIC:", None)?;
    draft.bukti_terkait = prompt_linked_evidence(store, &[])?;
    draft.status = prompt_request_status(&draft.bukti_terkait, draft.status)?;

    Ok(draft)
}

/// Prompts for changes to an existing request
pub fn prompt_edit_request(store: &AuditStore, current: &Request) -> Result<Request> {
    let mut req = current.clone();

    req.unit = Text::new("Unit:").with_initial_value(&req.unit).prompt()?;
    req.deskripsi = Text::new("Deskripsi:")
        .with_initial_value(&req.deskripsi)
        .prompt()?;
    req.tanggal = prompt_date("Tanggal:", Some(req.tanggal))?.unwrap_or(req.tanggal);
    req.tenggat = prompt_date("Tenggat (kosongkan jika tidak ada):", req.tenggat)?;
    req.pic = prompt_optional("PIC:", req.pic.as_deref())?;
    req.bukti_terkait = prompt_linked_evidence(store, &req.bukti_terkait)?;
    req.status = prompt_request_status(&req.bukti_terkait, req.status)?;

    Ok(req)
}

fn prompt_linked_evidence(store: &AuditStore, current: &[String]) -> Result<Vec<String>> {
    if store.evidence().is_empty() {
        println!("Tidak ada bukti di bank bukti.");
        return Ok(current.to_vec());
    }

    let choices: Vec<Choice> = store
        .evidence()
        .iter()
        .map(|e| Choice {
            id: e.id.clone(),
            label: e.deskripsi.clone(),
        })
        .collect();
    let defaults: Vec<usize> = choices
        .iter()
        .enumerate()
        .filter(|(_, c)| current.contains(&c.id))
        .map(|(i, _)| i)
        .collect();

    let selected = MultiSelect::new("Bukti Terkait:", choices)
        .with_default(&defaults)
        .prompt()?;
    Ok(selected.into_iter().map(|c| c.id).collect())
}

/// Fulfilled is only offered once some evidence is linked
fn prompt_request_status(bukti_terkait: &[String], current: RequestStatus) -> Result<RequestStatus> {
    if bukti_terkait.is_empty() {
        return Ok(RequestStatus::Pending);
    }
    let options = vec![RequestStatus::Pending, RequestStatus::Fulfilled];
    let start = if current == RequestStatus::Fulfilled { 1 } else { 0 };
    Ok(Select::new("Status:", options)
        .with_starting_cursor(start)
        .prompt()?)
}

// =========================================================================
// Evidence
// =========================================================================

/// Prompts for new evidence, including the link or an uploaded file
pub fn prompt_new_evidence(store: &AuditStore) -> Result<EvidenceDraft> {
    let kategori = Text::new("Kategori:").prompt()?;
    let deskripsi = Text::new("Deskripsi:").prompt()?;
    let unit = Text::new("Unit:").prompt()?;
    let mut draft = EvidenceDraft::new(kategori, deskripsi, unit);

    if let Some(attachment) = prompt_attachment()? {
        attachment.apply_to(&mut draft);
    } else {
        draft.link = Text::new("Link:").prompt()?;
    }

    draft.pic = prompt_optional("PIC:", None)?;
    draft.tgl_diterima = prompt_date("Tanggal Diterima:", Some(draft.tgl_diterima))?
        .unwrap_or(draft.tgl_diterima);
    draft.validitas = prompt_validity(draft.validitas)?;
    draft.catatan = prompt_optional("Catatan:", None)?;
    draft.prm_terkait = prompt_request_link(store, None)?;

    Ok(draft)
}

/// Prompts for changes to existing evidence
pub fn prompt_edit_evidence(store: &AuditStore, current: &Evidence) -> Result<Evidence> {
    let mut ev = current.clone();

    ev.kategori = Text::new("Kategori:")
        .with_initial_value(&ev.kategori)
        .prompt()?;
    ev.deskripsi = Text::new("Deskripsi:")
        .with_initial_value(&ev.deskripsi)
        .prompt()?;
    ev.unit = Text::new("Unit:").with_initial_value(&ev.unit).prompt()?;

    let replace = if ev.has_attachment() {
        confirm(&format!(
            "Ganti file {}?",
            ev.filename.as_deref().unwrap_or_default()
        ))?
    } else {
        true
    };
    if replace {
        if let Some(attachment) = prompt_attachment()? {
            attachment.apply_to_evidence(&mut ev);
        } else {
            let initial = if ev.has_attachment() { "" } else { ev.link.as_str() };
            ev.link = Text::new("Link:").with_initial_value(initial).prompt()?;
            ev.filename = None;
        }
    }

    ev.pic = prompt_optional("PIC:", ev.pic.as_deref())?;
    ev.tgl_diterima = prompt_date("Tanggal Diterima:", Some(ev.tgl_diterima))?
        .unwrap_or(ev.tgl_diterima);
    ev.validitas = prompt_validity(ev.validitas)?;
    ev.catatan = prompt_optional("Catatan:", ev.catatan.as_deref())?;
    ev.prm_terkait = prompt_request_link(store, ev.prm_terkait.as_deref())?;

    Ok(ev)
}

/// Asks whether to upload a file. Returns `None` when a plain link is wanted.
fn prompt_attachment() -> Result<Option<Attachment>> {
    let options = vec!["Link", "Upload file"];
    if Select::new("Sumber Bukti:", options).prompt()? == "Link" {
        return Ok(None);
    }

    loop {
        let path = PathBuf::from(Text::new("Path file:").prompt()?);
        match Attachment::from_path(&path) {
            Ok(attachment) => return Ok(Some(attachment)),
            Err(e) => println!("{:#}", e),
        }
    }
}

fn prompt_validity(current: EvidenceValidity) -> Result<EvidenceValidity> {
    let options = vec![EvidenceValidity::Valid, EvidenceValidity::NeedsImprovement];
    let start = if current == EvidenceValidity::NeedsImprovement { 1 } else { 0 };
    Ok(Select::new("Validitas:", options)
        .with_starting_cursor(start)
        .prompt()?)
}

fn prompt_request_link(store: &AuditStore, current: Option<&str>) -> Result<Option<String>> {
    let mut choices = vec![Choice {
        id: NO_LINK.to_string(),
        label: String::new(),
    }];
    choices.extend(store.requests().iter().map(|r| Choice {
        id: r.id.clone(),
        label: r.deskripsi.clone(),
    }));
    let start = current
        .and_then(|id| choices.iter().position(|c| c.id == id))
        .unwrap_or(0);

    let choice = Select::new("PRM Terkait:", choices)
        .with_starting_cursor(start)
        .prompt()?;
    Ok((choice.id != NO_LINK).then_some(choice.id))
}

// =========================================================================
// Field helpers
// =========================================================================

fn prompt_optional(message: &str, current: Option<&str>) -> Result<Option<String>> {
    let value = Text::new(message)
        .with_initial_value(current.unwrap_or_default())
        .prompt()?;
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

/// Prompts for a YYYY-MM-DD date. Empty input gives `None`.
fn prompt_date(message: &str, current: Option<NaiveDate>) -> Result<Option<NaiveDate>> {
    let initial = current.map(|d| d.to_string()).unwrap_or_default();
    loop {
        let raw = Text::new(message)
            .with_initial_value(&initial)
            .with_help_message("Format: YYYY-MM-DD")
            .prompt()?;
        match parse_date(&raw) {
            Ok(date) => return Ok(date),
            Err(msg) => println!("{}", msg),
        }
    }
}

pub fn parse_date(raw: &str) -> std::result::Result<Option<NaiveDate>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("Tanggal tidak valid: '{}' (format YYYY-MM-DD)", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date(""), Ok(None));
        assert_eq!(parse_date(" 2025-03-01 "), Ok(NaiveDate::from_ymd_opt(2025, 3, 1)));
        assert!(parse_date("01/03/2025").is_err());
    }

    #[test]
    fn test_choice_display() {
        let c = Choice {
            id: "PRM-001".into(),
            label: "Neraca".into(),
        };
        assert_eq!(c.to_string(), "PRM-001 - Neraca");
        let c = Choice {
            id: NO_LINK.into(),
            label: String::new(),
        };
        assert_eq!(c.to_string(), "-");
    }
}
