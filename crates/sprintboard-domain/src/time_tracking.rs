//! Time-log validation and the per-member logging cap.

use chrono::{DateTime, NaiveDate, Utc};
use sprintboard_core::{Rejection, RejectionCode, Seconds, SprintboardError, SprintboardResult};

use crate::project::UserId;
use crate::task::Task;
use crate::time_log::{NewTimeLog, TimeLog};

/// The validated calendar window a submission covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl LogWindow {
    /// Inclusive number of calendar days, at least 1.
    pub fn days(&self) -> u64 {
        let span = (self.to - self.from).num_days();
        span.max(0) as u64 + 1
    }
}

/// Validate a submission against the task it targets.
///
/// Returns the window and the submitted remaining-time figure.
pub fn validate_submission(
    submission: &NewTimeLog,
    task: &Task,
    actor: UserId,
    now: DateTime<Utc>,
) -> SprintboardResult<(LogWindow, Seconds)> {
    if actor.is_nil() {
        return Err(SprintboardError::Validation(
            "Time log creator is required".to_string(),
        ));
    }
    if submission.logged_time == 0 {
        return Err(SprintboardError::Validation(
            "Logged time must be greater than zero".to_string(),
        ));
    }
    let remaining = submission.remaining_time.ok_or_else(|| {
        SprintboardError::Validation("Remaining time is required".to_string())
    })?;
    if submission.description.trim().is_empty() {
        return Err(SprintboardError::Validation(
            "Description cannot be empty".to_string(),
        ));
    }
    let start = submission
        .start_date
        .ok_or_else(|| SprintboardError::Validation("Start date is required".to_string()))?;

    let created_on = task.created_at.date_naive();
    if start.date_naive() < created_on {
        return Err(SprintboardError::Validation(format!(
            "Start date {} is before the task was created on {}",
            start.date_naive(),
            created_on
        )));
    }
    if start > now {
        return Err(SprintboardError::Validation(
            "Start date cannot be in the future".to_string(),
        ));
    }

    let mut window = LogWindow {
        start,
        end: None,
        from: start.date_naive(),
        to: start.date_naive(),
    };

    if submission.is_period {
        let end = submission.end_date.ok_or_else(|| {
            SprintboardError::Validation("End date is required for a period".to_string())
        })?;
        if end < start {
            return Err(SprintboardError::Validation(
                "End date cannot be before start date".to_string(),
            ));
        }
        if end.date_naive() < created_on {
            return Err(SprintboardError::Validation(format!(
                "End date {} is before the task was created on {}",
                end.date_naive(),
                created_on
            )));
        }
        window.end = Some(end);
        window.to = end.date_naive();
    }

    Ok((window, remaining))
}

/// Reject when the member's logs overlapping `window`, plus `new_seconds`,
/// exceed `per_day × days`.
pub fn check_logging_limit(
    member_logs: &[&TimeLog],
    member_id: UserId,
    window: &LogWindow,
    new_seconds: Seconds,
    per_day: Seconds,
) -> Result<(), Rejection> {
    let prior: Seconds = member_logs
        .iter()
        .filter(|log| log.created_by == member_id && log.overlaps(window.from, window.to))
        .map(|log| log.logged_time)
        .sum();
    let limit = per_day * window.days();
    let total = prior + new_seconds;

    if total > limit {
        return Err(Rejection::new(
            RejectionCode::LoggingLimitExceeded,
            Some(member_id),
            format!(
                "Logging {}s brings the total to {}s, over the limit of {}s between {} and {}",
                new_seconds, total, limit, window.from, window.to
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    const HOUR: Seconds = 3_600;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, 10, 15, 0, 0).unwrap()
    }

    fn task() -> Task {
        let mut task = Task::new(Uuid::new_v4(), "Task", Uuid::new_v4());
        task.created_at = Utc.with_ymd_and_hms(2030, 3, 1, 12, 0, 0).unwrap();
        task.set_estimate(10 * HOUR);
        task
    }

    fn submission(logged: Seconds, start: DateTime<Utc>) -> NewTimeLog {
        NewTimeLog {
            task_id: Uuid::new_v4(),
            logged_time: logged,
            remaining_time: Some(HOUR),
            description: "Pairing".to_string(),
            start_date: Some(start),
            ..Default::default()
        }
    }

    fn prior_log(member: UserId, logged: Seconds, start: DateTime<Utc>) -> TimeLog {
        TimeLog {
            id: Uuid::new_v4(),
            created_by: member,
            task_id: Uuid::new_v4(),
            sprint_id: None,
            logged_time: logged,
            remaining_time: 0,
            start_date: start,
            end_date: None,
            description: "earlier".to_string(),
            is_period: false,
            created_at: start,
        }
    }

    #[test]
    fn accepts_valid_single_day_submission() {
        let start = now() - Duration::hours(2);
        let (window, remaining) =
            validate_submission(&submission(HOUR, start), &task(), Uuid::new_v4(), now()).unwrap();
        assert_eq!(remaining, HOUR);
        assert_eq!(window.days(), 1);
        assert_eq!(window.from, window.to);
    }

    #[test]
    fn rejects_invalid_submissions() {
        let actor = Uuid::new_v4();
        let start = now() - Duration::hours(2);

        let zero = submission(0, start);
        assert!(validate_submission(&zero, &task(), actor, now()).is_err());

        let mut no_remaining = submission(HOUR, start);
        no_remaining.remaining_time = None;
        assert!(validate_submission(&no_remaining, &task(), actor, now()).is_err());

        let mut blank = submission(HOUR, start);
        blank.description = "   ".to_string();
        assert!(validate_submission(&blank, &task(), actor, now()).is_err());

        let mut no_start = submission(HOUR, start);
        no_start.start_date = None;
        assert!(validate_submission(&no_start, &task(), actor, now()).is_err());

        let future = submission(HOUR, now() + Duration::hours(1));
        assert!(validate_submission(&future, &task(), actor, now()).is_err());

        let before_creation = submission(HOUR, Utc.with_ymd_and_hms(2030, 2, 27, 9, 0, 0).unwrap());
        assert!(validate_submission(&before_creation, &task(), actor, now()).is_err());

        assert!(validate_submission(&submission(HOUR, start), &task(), Uuid::nil(), now()).is_err());
    }

    #[test]
    fn start_on_creation_day_before_creation_hour_is_allowed() {
        let start = Utc.with_ymd_and_hms(2030, 3, 1, 9, 0, 0).unwrap();
        assert!(validate_submission(&submission(HOUR, start), &task(), Uuid::new_v4(), now()).is_ok());
    }

    #[test]
    fn period_requires_ordered_end() {
        let start = Utc.with_ymd_and_hms(2030, 3, 4, 9, 0, 0).unwrap();
        let mut period = submission(HOUR, start);
        period.is_period = true;
        assert!(validate_submission(&period, &task(), Uuid::new_v4(), now()).is_err());

        period.end_date = Some(start - Duration::hours(1));
        assert!(validate_submission(&period, &task(), Uuid::new_v4(), now()).is_err());

        period.end_date = Some(Utc.with_ymd_and_hms(2030, 3, 6, 17, 0, 0).unwrap());
        let (window, _) = validate_submission(&period, &task(), Uuid::new_v4(), now()).unwrap();
        assert_eq!(window.days(), 3);
    }

    #[test]
    fn logging_cap_counts_overlapping_member_logs() {
        let member = Uuid::new_v4();
        let day = Utc.with_ymd_and_hms(2030, 3, 4, 9, 0, 0).unwrap();
        let window = LogWindow {
            start: day,
            end: None,
            from: day.date_naive(),
            to: day.date_naive(),
        };
        let earlier = prior_log(member, 6 * HOUR, day);
        let other_member = prior_log(Uuid::new_v4(), 8 * HOUR, day);
        let other_day = prior_log(member, 8 * HOUR, day - Duration::days(1));
        let logs = vec![&earlier, &other_member, &other_day];

        let rejection = check_logging_limit(&logs, member, &window, 3 * HOUR, 8 * HOUR).unwrap_err();
        assert_eq!(rejection.code, RejectionCode::LoggingLimitExceeded);
        assert_eq!(rejection.entity_id, Some(member));

        assert!(check_logging_limit(&logs, member, &window, 2 * HOUR, 8 * HOUR).is_ok());
    }

    #[test]
    fn logging_cap_scales_with_period_length() {
        let member = Uuid::new_v4();
        let from = Utc.with_ymd_and_hms(2030, 3, 4, 9, 0, 0).unwrap();
        let window = LogWindow {
            start: from,
            end: Some(from + Duration::days(2)),
            from: from.date_naive(),
            to: (from + Duration::days(2)).date_naive(),
        };
        assert!(check_logging_limit(&[], member, &window, 24 * HOUR, 8 * HOUR).is_ok());
        assert!(check_logging_limit(&[], member, &window, 24 * HOUR + 1, 8 * HOUR).is_err());
    }

    #[test]
    fn zero_daily_capacity_rejects_everything() {
        let day = Utc.with_ymd_and_hms(2030, 3, 4, 9, 0, 0).unwrap();
        let window = LogWindow {
            start: day,
            end: None,
            from: day.date_naive(),
            to: day.date_naive(),
        };
        assert!(check_logging_limit(&[], Uuid::new_v4(), &window, 1, 0).is_err());
    }
}
