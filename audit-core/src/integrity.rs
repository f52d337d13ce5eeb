//! Referential integrity rules between projects, requests and evidence
//!
//! Each rule is a plain function over the collections so the store can run
//! them inside a single mutation, and so they can be tested on their own.
//! None of them can fail: the store checks ids before calling them.

use chrono::NaiveDate;

use crate::models::{Evidence, Request, RequestStatus};

/// Outcome of removing an evidence id from the requests that link it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnlinkReport {
    /// Requests that referenced the evidence
    pub unlinked: usize,
    /// Of those, requests forced back to pending because nothing was left linked
    pub reverted: usize,
}

/// Brings a request's status and fulfillment date in line with its evidence.
///
/// - No linked evidence forces `Pending`.
/// - `Fulfilled` without a fulfillment date gets `today`.
/// - `Pending` never keeps a fulfillment date.
pub fn enforce_fulfillment(request: &mut Request, today: NaiveDate) {
    if request.bukti_terkait.is_empty() && request.status == RequestStatus::Fulfilled {
        log::debug!("{} has no linked evidence, keeping it pending", request.id);
        request.status = RequestStatus::Pending;
    }

    match request.status {
        RequestStatus::Fulfilled => {
            if request.pemenuhan.is_none() {
                request.pemenuhan = Some(today);
            }
        }
        RequestStatus::Pending => request.pemenuhan = None,
    }
}

/// Removes every request belonging to `project_id`. Returns how many were removed.
pub fn cascade_project_requests(requests: &mut Vec<Request>, project_id: &str) -> usize {
    let before = requests.len();
    requests.retain(|r| r.audit_project_id != project_id);
    before - requests.len()
}

/// Clears `prm_terkait` on evidence pointing at `request_id`. Returns how many were cleared.
pub fn clear_evidence_backlinks(evidence: &mut [Evidence], request_id: &str) -> usize {
    let mut cleared = 0;
    for item in evidence
        .iter_mut()
        .filter(|e| e.prm_terkait.as_deref() == Some(request_id))
    {
        item.prm_terkait = None;
        cleared += 1;
    }
    cleared
}

/// Strips `evidence_id` from every request's linked evidence.
///
/// Requests left without any linked evidence go back to pending and lose
/// their fulfillment date.
pub fn unlink_evidence(requests: &mut [Request], evidence_id: &str) -> UnlinkReport {
    let mut report = UnlinkReport::default();

    for request in requests.iter_mut() {
        let before = request.bukti_terkait.len();
        request.bukti_terkait.retain(|id| id != evidence_id);
        if request.bukti_terkait.len() == before {
            continue;
        }

        report.unlinked += 1;
        if request.bukti_terkait.is_empty() {
            if request.status == RequestStatus::Fulfilled {
                report.reverted += 1;
            }
            request.status = RequestStatus::Pending;
            request.pemenuhan = None;
        }
    }

    report
}
