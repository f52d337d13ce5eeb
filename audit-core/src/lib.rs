pub mod attachment;
pub mod config;
pub mod deadline;
pub mod error;
pub mod export;
pub mod ids;
pub mod integrity;
pub mod models;
pub mod seed;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use attachment::{decode_data_uri, encode_data_uri, Attachment};
pub use config::{get_config_path, parse_warning_days, Settings};
pub use deadline::{
    classify, classify_on, deadline_tag, deadline_tag_on, today, Deadline, DeadlineStatus,
    DEFAULT_WARNING_DAYS,
};
pub use error::{EntityKind, StoreError, StoreResult};
pub use export::{export_fulfilled_csv, export_snapshot_json, CsvExport, FULFILLED_CSV_FILENAME};
pub use models::{
    AuditProject, Evidence, EvidenceDraft, EvidenceValidity, Request, RequestDraft, RequestStatus,
    Snapshot,
};
pub use seed::load_snapshot;
pub use stats::{
    chart_series, compute_per_project_breakdown, compute_request_counts_by_project, compute_stats,
    compute_stats_on, DashboardStats, ProjectBreakdown, ProjectCount, UNASSIGNED_LABEL,
};
pub use store::{AuditStore, LinkedEvidence};
