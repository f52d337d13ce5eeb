use audit_core::{
    compute_per_project_breakdown, compute_request_counts_by_project, compute_stats_on,
    export_fulfilled_csv, load_snapshot, AuditStore, EvidenceDraft, RequestDraft, RequestStatus,
    StoreError,
};
use chrono::NaiveDate;
use std::path::PathBuf;

fn fixed_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 5).unwrap()
}

fn seed_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("data")
        .join("seed.yaml")
}

fn assert_fulfillment_invariants(store: &AuditStore) {
    for req in store.requests() {
        match req.status {
            RequestStatus::Fulfilled => {
                assert!(!req.bukti_terkait.is_empty(), "{} fulfilled without evidence", req.id);
                assert!(req.pemenuhan.is_some(), "{} fulfilled without date", req.id);
            }
            RequestStatus::Pending => {
                assert!(req.pemenuhan.is_none(), "{} pending with date", req.id)
            }
        }
    }
}

#[test]
fn test_evidence_lifecycle_drives_request_status() {
    let mut store = AuditStore::new().with_clock(fixed_day);

    let project = store.create_project("Audit A").unwrap();
    assert_eq!(project.id, "PROJ-01");

    let mut draft = RequestDraft::new("Keuangan", "Neraca saldo");
    draft.status = RequestStatus::Fulfilled;
    let request = store.create_request(draft, &project.id).unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_fulfillment_invariants(&store);

    let evidence = store
        .create_evidence(EvidenceDraft::new("Dokumen", "Neraca saldo 2024", "Keuangan"))
        .unwrap();
    assert_eq!(evidence.id, "BKT-001");

    let mut linked = request.clone();
    linked.bukti_terkait.push(evidence.id.clone());
    linked.status = RequestStatus::Fulfilled;
    let stored = store.update_request(linked).unwrap();
    assert_eq!(stored.status, RequestStatus::Fulfilled);
    assert_eq!(stored.pemenuhan, Some(fixed_day()));
    assert_fulfillment_invariants(&store);

    store.delete_evidence(&evidence.id).unwrap();
    let after = store.get_request(&request.id).unwrap();
    assert!(after.bukti_terkait.is_empty());
    assert_eq!(after.status, RequestStatus::Pending);
    assert_eq!(after.pemenuhan, None);
    assert_fulfillment_invariants(&store);
}

#[test]
fn test_export_with_nothing_fulfilled() {
    let mut store = AuditStore::new().with_clock(fixed_day);
    let project = store.create_project("Audit A").unwrap();
    store
        .create_request(RequestDraft::new("SDM", "Daftar pegawai"), &project.id)
        .unwrap();

    assert_eq!(export_fulfilled_csv(store.requests()), Err(StoreError::EmptyExport));
}

#[test]
fn test_seeded_store_continues_numbering() {
    let snapshot = load_snapshot(&seed_path()).unwrap();
    let mut store = AuditStore::from_snapshot(snapshot).with_clock(fixed_day);
    assert_fulfillment_invariants(&store);

    assert_eq!(store.create_project("Audit C").unwrap().id, "PROJ-03");
    assert_eq!(
        store
            .create_request(RequestDraft::new("U", "D"), "PROJ-01")
            .unwrap()
            .id,
        "PRM-005"
    );
    assert_eq!(
        store
            .create_evidence(EvidenceDraft::new("K", "D", "U"))
            .unwrap()
            .id,
        "BKT-004"
    );
}

#[test]
fn test_seeded_cascades() {
    let snapshot = load_snapshot(&seed_path()).unwrap();
    let mut store = AuditStore::from_snapshot(snapshot).with_clock(fixed_day);

    // PRM-001 is the only request pointing back from BKT-001
    store.delete_request("PRM-001").unwrap();
    assert_eq!(store.get_evidence("BKT-001").unwrap().prm_terkait, None);
    assert_eq!(
        store.get_evidence("BKT-002").unwrap().prm_terkait.as_deref(),
        Some("PRM-004")
    );

    // PRM-004 keeps BKT-003, so it stays fulfilled
    store.delete_evidence("BKT-002").unwrap();
    let prm4 = store.get_request("PRM-004").unwrap();
    assert_eq!(prm4.bukti_terkait, vec!["BKT-003".to_string()]);
    assert_eq!(prm4.status, RequestStatus::Fulfilled);

    store.delete_project("PROJ-02").unwrap();
    assert!(store.get_request("PRM-004").is_none());
    assert!(store.get_request("PRM-002").is_some());
    assert_eq!(store.evidence().len(), 2);
    assert_fulfillment_invariants(&store);
}

#[test]
fn test_seeded_dashboard() {
    let snapshot = load_snapshot(&seed_path()).unwrap();
    let store = AuditStore::from_snapshot(snapshot);

    // PRM-002 is due 2025-02-10, five days after the fixed date
    let stats = compute_stats_on(store.requests(), 7, fixed_day());
    assert_eq!(stats.total, 3);
    assert_eq!(stats.fulfilled, 2);
    assert_eq!(stats.approaching_deadline, 1);
    assert_eq!(stats.overdue, 0);
    assert_eq!(stats.fulfillment_percentage, 67);

    let stats = compute_stats_on(store.requests(), 7, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    assert_eq!(stats.approaching_deadline, 0);
    assert_eq!(stats.overdue, 1);

    let breakdown = compute_per_project_breakdown(store.requests(), store.projects());
    assert_eq!(breakdown[0].fulfilled, 1);
    assert_eq!(breakdown[0].pending, 1);
    assert_eq!(breakdown[1].fulfilled, 1);

    let counts = compute_request_counts_by_project(store.requests(), store.projects());
    assert_eq!(counts.len(), 2);
    assert_eq!(counts[0].count, 2);

    let csv = export_fulfilled_csv(store.requests()).unwrap();
    assert_eq!(csv.rows, 2);
    assert!(csv.content.contains("PRM-004,2025-02-03,Pengadaan"));
}
