//! Deadline classification for request due dates
//!
//! Days are counted on calendar dates, so the time of day never matters.
//! The warning threshold is passed in on every call.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::fmt;

use crate::models::{Request, RequestStatus};

/// Warning threshold used when nothing else is configured
pub const DEFAULT_WARNING_DAYS: i64 = 7;

/// How urgent a due date is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineStatus {
    /// More than the warning threshold away
    Ok,
    /// Within the warning threshold
    Warning,
    /// Due today
    Deadline,
    /// Past due
    Overdue,
}

impl DeadlineStatus {
    /// Whether listings should show a tag for this status
    pub fn is_flagged(&self) -> bool {
        !matches!(self, DeadlineStatus::Ok)
    }
}

impl fmt::Display for DeadlineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeadlineStatus::Ok => write!(f, "ok"),
            DeadlineStatus::Warning => write!(f, "warning"),
            DeadlineStatus::Deadline => write!(f, "deadline"),
            DeadlineStatus::Overdue => write!(f, "overdue"),
        }
    }
}

/// Result of classifying a due date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deadline {
    /// Whole days from today to the due date; negative once overdue
    pub days_remaining: i64,
    pub status: DeadlineStatus,
    pub label: String,
}

/// Current local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Classifies `due` against today's date.
///
/// Returns `None` when there is no due date.
pub fn classify(due: Option<NaiveDate>, warning_days: i64) -> Option<Deadline> {
    classify_on(due, warning_days, today())
}

/// Classifies `due` as seen from `today`
pub fn classify_on(due: Option<NaiveDate>, warning_days: i64, today: NaiveDate) -> Option<Deadline> {
    let due = due?;
    let days_remaining = (due - today).num_days();

    // Ties go to the more urgent state.
    let (status, label) = if days_remaining < 0 {
        (
            DeadlineStatus::Overdue,
            format!("Terlambat {} hari", -days_remaining),
        )
    } else if days_remaining == 0 {
        (DeadlineStatus::Deadline, "Hari ini".to_string())
    } else if days_remaining <= warning_days {
        (DeadlineStatus::Warning, format!("{} hari lagi", days_remaining))
    } else {
        (DeadlineStatus::Ok, format!("{} hari lagi", days_remaining))
    };

    Some(Deadline {
        days_remaining,
        status,
        label,
    })
}

/// Tag shown next to a request in listings.
///
/// Only pending requests with a due date get one, and only when the
/// classification is more urgent than `Ok`.
pub fn deadline_tag(request: &Request, warning_days: i64) -> Option<Deadline> {
    deadline_tag_on(request, warning_days, today())
}

pub fn deadline_tag_on(request: &Request, warning_days: i64, today: NaiveDate) -> Option<Deadline> {
    if request.status != RequestStatus::Pending {
        return None;
    }
    classify_on(request.tenggat, warning_days, today).filter(|d| d.status.is_flagged())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_no_due_date_is_unclassified() {
        assert_eq!(classify_on(None, 7, day()), None);
    }

    #[test]
    fn test_yesterday_is_overdue() {
        let d = classify_on(Some(day() - Duration::days(1)), 7, day()).unwrap();
        assert_eq!(d.status, DeadlineStatus::Overdue);
        assert_eq!(d.days_remaining, -1);
        assert_eq!(d.label, "Terlambat 1 hari");
    }

    #[test]
    fn test_today_is_deadline() {
        let d = classify_on(Some(day()), 7, day()).unwrap();
        assert_eq!(d.status, DeadlineStatus::Deadline);
        assert_eq!(d.label, "Hari ini");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let d = classify_on(Some(day() + Duration::days(7)), 7, day()).unwrap();
        assert_eq!(d.status, DeadlineStatus::Warning);
        assert_eq!(d.label, "7 hari lagi");

        let d = classify_on(Some(day() + Duration::days(8)), 7, day()).unwrap();
        assert_eq!(d.status, DeadlineStatus::Ok);
        assert!(!d.status.is_flagged());
        assert_eq!(d.label, "8 hari lagi");
    }

    #[test]
    fn test_zero_warning_days_never_warns() {
        let d = classify_on(Some(day() + Duration::days(1)), 0, day()).unwrap();
        assert_eq!(d.status, DeadlineStatus::Ok);
        let d = classify_on(Some(day()), 0, day()).unwrap();
        assert_eq!(d.status, DeadlineStatus::Deadline);
    }

    #[test]
    fn test_deadline_tag_skips_fulfilled_and_ok() {
        let mut req = Request::from_draft(
            "PRM-001".into(),
            "PROJ-01".into(),
            crate::models::RequestDraft::new("Keuangan", "Neraca"),
        );
        req.tenggat = Some(day() - Duration::days(3));
        let tag = deadline_tag_on(&req, 7, day()).unwrap();
        assert_eq!(tag.status, DeadlineStatus::Overdue);

        req.tenggat = Some(day() + Duration::days(30));
        assert_eq!(deadline_tag_on(&req, 7, day()), None);

        req.tenggat = Some(day() - Duration::days(3));
        req.bukti_terkait.push("BKT-001".into());
        req.status = RequestStatus::Fulfilled;
        assert_eq!(deadline_tag_on(&req, 7, day()), None);
    }
}
