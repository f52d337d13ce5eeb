//! Dashboard statistics derived from a snapshot of the store
//!
//! Everything here is read-only over slices of requests and projects.

use chrono::NaiveDate;
use serde::Serialize;

use crate::deadline::{classify_on, today, DeadlineStatus};
use crate::models::{AuditProject, Request, RequestStatus};

/// Label for requests whose project no longer exists
pub const UNASSIGNED_LABEL: &str = "Unassigned";

/// Headline numbers for the dashboard cards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub fulfilled: usize,
    /// Pending requests within the warning threshold
    pub approaching_deadline: usize,
    /// Pending requests past their due date
    pub overdue: usize,
    /// Rounded percentage of fulfilled requests, 0 when there are none
    pub fulfillment_percentage: u32,
}

/// Fulfilled/pending split for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectBreakdown {
    pub project_id: String,
    pub project_name: String,
    pub fulfilled: usize,
    pub pending: usize,
}

impl ProjectBreakdown {
    pub fn total(&self) -> usize {
        self.fulfilled + self.pending
    }
}

/// Request count under one project display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectCount {
    pub name: String,
    pub count: usize,
}

/// Computes the dashboard cards using today's date
pub fn compute_stats(requests: &[Request], warning_days: i64) -> DashboardStats {
    compute_stats_on(requests, warning_days, today())
}

pub fn compute_stats_on(requests: &[Request], warning_days: i64, today: NaiveDate) -> DashboardStats {
    let total = requests.len();
    let fulfilled = requests
        .iter()
        .filter(|r| r.status == RequestStatus::Fulfilled)
        .count();

    let pending_status = |status: DeadlineStatus| {
        requests
            .iter()
            .filter(|r| r.status == RequestStatus::Pending)
            .filter_map(|r| classify_on(r.tenggat, warning_days, today))
            .filter(|d| d.status == status)
            .count()
    };

    DashboardStats {
        total,
        fulfilled,
        approaching_deadline: pending_status(DeadlineStatus::Warning),
        overdue: pending_status(DeadlineStatus::Overdue),
        fulfillment_percentage: percentage(fulfilled, total),
    }
}

fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 * 100.0 / total as f64).round() as u32
}

/// Per-project fulfilled/pending counts, one entry per project in project order.
///
/// Projects without requests are included; use [`chart_series`] to drop them.
pub fn compute_per_project_breakdown(requests: &[Request], projects: &[AuditProject]) -> Vec<ProjectBreakdown> {
    projects
        .iter()
        .map(|project| {
            let (fulfilled, pending) = requests
                .iter()
                .filter(|r| r.audit_project_id == project.id)
                .fold((0, 0), |(f, p), r| match r.status {
                    RequestStatus::Fulfilled => (f + 1, p),
                    RequestStatus::Pending => (f, p + 1),
                });
            ProjectBreakdown {
                project_id: project.id.clone(),
                project_name: project.name.clone(),
                fulfilled,
                pending,
            }
        })
        .collect()
}

/// Breakdown entries that have at least one request
pub fn chart_series(breakdown: &[ProjectBreakdown]) -> Vec<&ProjectBreakdown> {
    breakdown.iter().filter(|b| b.total() > 0).collect()
}

/// Number of requests per project display name, in order of first appearance.
///
/// Requests pointing at an unknown project are counted under [`UNASSIGNED_LABEL`].
/// Projects sharing a name share an entry.
pub fn compute_request_counts_by_project(requests: &[Request], projects: &[AuditProject]) -> Vec<ProjectCount> {
    let mut counts: Vec<ProjectCount> = Vec::new();

    for req in requests {
        let name = projects
            .iter()
            .find(|p| p.id == req.audit_project_id)
            .map(|p| p.name.as_str())
            .unwrap_or(UNASSIGNED_LABEL);

        match counts.iter_mut().find(|c| c.name == name) {
            Some(entry) => entry.count += 1,
            None => counts.push(ProjectCount {
                name: name.to_string(),
                count: 1,
            }),
        }
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RequestDraft;
    use chrono::Duration;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()
    }

    fn request(id: &str, project: &str, status: RequestStatus, due_in: Option<i64>) -> Request {
        let mut req = Request::from_draft(id.into(), project.into(), RequestDraft::new("U", "D"));
        req.status = status;
        req.tenggat = due_in.map(|d| day() + Duration::days(d));
        if status == RequestStatus::Fulfilled {
            req.bukti_terkait = vec!["BKT-001".into()];
            req.pemenuhan = Some(day());
        }
        req
    }

    fn project(id: &str, name: &str) -> AuditProject {
        AuditProject {
            id: id.into(),
            name: name.into(),
        }
    }

    #[test]
    fn test_stats_empty_has_zero_percentage() {
        let stats = compute_stats_on(&[], 7, day());
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn test_stats_counts_only_pending_deadlines() {
        let requests = vec![
            request("PRM-001", "PROJ-01", RequestStatus::Pending, Some(3)),
            request("PRM-002", "PROJ-01", RequestStatus::Pending, Some(-2)),
            request("PRM-003", "PROJ-01", RequestStatus::Fulfilled, Some(-5)),
            request("PRM-004", "PROJ-01", RequestStatus::Pending, Some(0)),
            request("PRM-005", "PROJ-01", RequestStatus::Pending, None),
            request("PRM-006", "PROJ-01", RequestStatus::Fulfilled, Some(2)),
        ];

        let stats = compute_stats_on(&requests, 7, day());

        assert_eq!(stats.total, 6);
        assert_eq!(stats.fulfilled, 2);
        assert_eq!(stats.approaching_deadline, 1);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.fulfillment_percentage, 33);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
    }

    #[test]
    fn test_breakdown_keeps_empty_projects_until_charted() {
        let projects = vec![project("PROJ-01", "A"), project("PROJ-02", "B")];
        let requests = vec![
            request("PRM-001", "PROJ-01", RequestStatus::Pending, None),
            request("PRM-002", "PROJ-01", RequestStatus::Fulfilled, None),
            request("PRM-003", "PROJ-01", RequestStatus::Pending, None),
        ];

        let breakdown = compute_per_project_breakdown(&requests, &projects);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].fulfilled, 1);
        assert_eq!(breakdown[0].pending, 2);
        assert_eq!(breakdown[1].total(), 0);

        let series = chart_series(&breakdown);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].project_name, "A");
    }

    #[test]
    fn test_counts_group_unknown_projects_as_unassigned() {
        let projects = vec![project("PROJ-01", "Audit A"), project("PROJ-02", "Audit B")];
        let requests = vec![
            request("PRM-001", "PROJ-02", RequestStatus::Pending, None),
            request("PRM-002", "PROJ-09", RequestStatus::Pending, None),
            request("PRM-003", "PROJ-02", RequestStatus::Pending, None),
            request("PRM-004", "PROJ-01", RequestStatus::Pending, None),
        ];

        let counts = compute_request_counts_by_project(&requests, &projects);

        assert_eq!(
            counts,
            vec![
                ProjectCount { name: "Audit B".into(), count: 2 },
                ProjectCount { name: UNASSIGNED_LABEL.into(), count: 1 },
                ProjectCount { name: "Audit A".into(), count: 1 },
            ]
        );
    }
}
