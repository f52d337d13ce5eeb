use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::deadline::today;

/// Prefix for audit project ids (`PROJ-01`)
pub const PROJECT_ID_PREFIX: &str = "PROJ";
/// Prefix for request ids (`PRM-001`)
pub const REQUEST_ID_PREFIX: &str = "PRM";
/// Prefix for evidence ids (`BKT-001`)
pub const EVIDENCE_ID_PREFIX: &str = "BKT";

/// Fulfillment state of a request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Pending,
    Fulfilled,
}

impl RequestStatus {
    /// Raw value as stored and exported
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Fulfilled => "Fulfilled",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "Belum"),
            RequestStatus::Fulfilled => write!(f, "Terpenuhi"),
        }
    }
}

/// Validity assessment of a piece of evidence
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum EvidenceValidity {
    #[default]
    Valid,
    NeedsImprovement,
}

impl fmt::Display for EvidenceValidity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvidenceValidity::Valid => write!(f, "Valid"),
            EvidenceValidity::NeedsImprovement => write!(f, "Perlu Perbaikan"),
        }
    }
}

/// An audit project grouping requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditProject {
    /// Project id (e.g., "PROJ-01")
    pub id: String,

    /// Display name
    pub name: String,
}

/// A request (permintaan) raised by the auditors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Request id (e.g., "PRM-001")
    pub id: String,

    /// Date the request was made
    pub tanggal: NaiveDate,

    /// Unit the request is addressed to
    pub unit: String,

    /// What is being requested
    pub deskripsi: String,

    /// Due date
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub tenggat: Option<NaiveDate>,

    /// Person in charge
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub pic: Option<String>,

    /// Owning audit project
    pub audit_project_id: String,

    /// Evidence ids linked from this request, in link order
    #[serde(default)]
    pub bukti_terkait: Vec<String>,

    pub status: RequestStatus,

    /// Fulfillment date, only set while fulfilled
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub pemenuhan: Option<NaiveDate>,
}

impl Request {
    /// Column names in field order, used as the CSV header
    pub const FIELD_NAMES: [&'static str; 10] = [
        "id",
        "tanggal",
        "unit",
        "deskripsi",
        "tenggat",
        "pic",
        "auditProjectId",
        "buktiTerkait",
        "status",
        "pemenuhan",
    ];

    /// Builds a request from form data once the store has assigned its id and project
    pub fn from_draft(id: String, audit_project_id: String, draft: RequestDraft) -> Self {
        Self {
            id,
            tanggal: draft.tanggal,
            unit: draft.unit,
            deskripsi: draft.deskripsi,
            tenggat: draft.tenggat,
            pic: draft.pic,
            audit_project_id,
            bukti_terkait: draft.bukti_terkait,
            status: draft.status,
            pemenuhan: draft.pemenuhan,
        }
    }

    pub fn is_fulfilled(&self) -> bool {
        self.status == RequestStatus::Fulfilled
    }

    /// Raw field values in `FIELD_NAMES` order. Linked evidence ids are joined with `;`.
    pub fn field_values(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.tanggal.to_string(),
            self.unit.clone(),
            self.deskripsi.clone(),
            self.tenggat.map(|d| d.to_string()).unwrap_or_default(),
            self.pic.clone().unwrap_or_default(),
            self.audit_project_id.clone(),
            self.bukti_terkait.join(";"),
            self.status.as_str().to_string(),
            self.pemenuhan.map(|d| d.to_string()).unwrap_or_default(),
        ]
    }
}

/// Form data for a new request, before an id and project are assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub tanggal: NaiveDate,
    pub unit: String,
    pub deskripsi: String,
    pub tenggat: Option<NaiveDate>,
    pub pic: Option<String>,
    pub bukti_terkait: Vec<String>,
    pub status: RequestStatus,
    pub pemenuhan: Option<NaiveDate>,
}

impl RequestDraft {
    /// Creates a pending draft dated today
    pub fn new(unit: impl Into<String>, deskripsi: impl Into<String>) -> Self {
        Self {
            tanggal: today(),
            unit: unit.into(),
            deskripsi: deskripsi.into(),
            tenggat: None,
            pic: None,
            bukti_terkait: Vec::new(),
            status: RequestStatus::Pending,
            pemenuhan: None,
        }
    }
}

/// A piece of evidence (bukti) in the evidence bank
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Evidence id (e.g., "BKT-001")
    pub id: String,

    pub kategori: String,

    pub deskripsi: String,

    /// External URL or an embedded `data:` URI
    pub link: String,

    /// Original name of an attached file
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    pub unit: String,

    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub pic: Option<String>,

    /// Date the evidence was received
    pub tgl_diterima: NaiveDate,

    pub validitas: EvidenceValidity,

    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub catatan: Option<String>,

    /// Request this evidence was submitted for. Not kept in sync with `Request::bukti_terkait`.
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub prm_terkait: Option<String>,
}

impl Evidence {
    pub fn from_draft(id: String, draft: EvidenceDraft) -> Self {
        Self {
            id,
            kategori: draft.kategori,
            deskripsi: draft.deskripsi,
            link: draft.link,
            filename: draft.filename,
            unit: draft.unit,
            pic: draft.pic,
            tgl_diterima: draft.tgl_diterima,
            validitas: draft.validitas,
            catatan: draft.catatan,
            prm_terkait: draft.prm_terkait,
        }
    }

    /// True when the link holds an uploaded file rather than an external URL
    pub fn has_attachment(&self) -> bool {
        self.filename.is_some() && self.link.starts_with("data:")
    }
}

/// Form data for new evidence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceDraft {
    pub kategori: String,
    pub deskripsi: String,
    pub link: String,
    pub filename: Option<String>,
    pub unit: String,
    pub pic: Option<String>,
    pub tgl_diterima: NaiveDate,
    pub validitas: EvidenceValidity,
    pub catatan: Option<String>,
    pub prm_terkait: Option<String>,
}

impl EvidenceDraft {
    /// Creates a valid draft received today
    pub fn new(kategori: impl Into<String>, deskripsi: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            kategori: kategori.into(),
            deskripsi: deskripsi.into(),
            link: String::new(),
            filename: None,
            unit: unit.into(),
            pic: None,
            tgl_diterima: today(),
            validitas: EvidenceValidity::Valid,
            catatan: None,
            prm_terkait: None,
        }
    }
}

/// The three collections as a unit, used for seeding and rendering
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub audit_projects: Vec<AuditProject>,
    #[serde(default)]
    pub requests: Vec<Request>,
    #[serde(default)]
    pub evidence: Vec<Evidence>,
}

/// Treats empty strings from form-style data as absent values
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_deserializes_blank_optionals() {
        let yaml = r#"
id: PRM-001
tanggal: 2025-01-10
unit: Keuangan
deskripsi: Laporan kas
tenggat: ""
pic: ""
auditProjectId: PROJ-01
buktiTerkait: []
status: Pending
"#;
        let req: Request = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(req.tenggat, None);
        assert_eq!(req.pic, None);
        assert_eq!(req.pemenuhan, None);
        assert_eq!(req.audit_project_id, "PROJ-01");
    }

    #[test]
    fn test_request_field_values_follow_field_names() {
        let req = Request {
            id: "PRM-002".into(),
            tanggal: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            unit: "SDM".into(),
            deskripsi: "Daftar pegawai".into(),
            tenggat: None,
            pic: Some("Budi".into()),
            audit_project_id: "PROJ-01".into(),
            bukti_terkait: vec!["BKT-001".into(), "BKT-003".into()],
            status: RequestStatus::Fulfilled,
            pemenuhan: NaiveDate::from_ymd_opt(2025, 2, 3),
        };

        let values = req.field_values();
        assert_eq!(values.len(), Request::FIELD_NAMES.len());
        assert_eq!(values[4], "");
        assert_eq!(values[7], "BKT-001;BKT-003");
        assert_eq!(values[8], "Fulfilled");
        assert_eq!(values[9], "2025-02-03");
    }

    #[test]
    fn test_has_attachment() {
        let mut ev = Evidence::from_draft("BKT-001".into(), EvidenceDraft::new("Dokumen", "SK", "Umum"));
        ev.link = "https://example.org/sk.pdf".into();
        assert!(!ev.has_attachment());

        ev.link = "data:application/pdf;base64,JVBERi0=".into();
        ev.filename = Some("sk.pdf".into());
        assert!(ev.has_attachment());
    }

    #[test]
    fn test_status_display_uses_locale_labels() {
        assert_eq!(RequestStatus::Pending.to_string(), "Belum");
        assert_eq!(RequestStatus::Fulfilled.to_string(), "Terpenuhi");
        assert_eq!(EvidenceValidity::NeedsImprovement.to_string(), "Perlu Perbaikan");
    }
}
