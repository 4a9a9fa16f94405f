//! Recurring-task expansion.
//!
//! # Responsibility
//! - Turn one task template into the finite, ordered batch of instances
//!   the store inserts in a single transaction.
//! - Own the canonical due-date stepping rule per pattern.
//!
//! # Invariants
//! - Expansion is pure: no I/O, all `recurrence_count` instances or none.
//! - Instance numbering is strictly sequential; instance i+1's due date is
//!   derived from instance i's.
//! - Only instance 1 starts visible; the series is closed at creation time
//!   and never grows.

use crate::model::task::{RecurrencePattern, Task, TaskStatus, TaskTemplate};
use chrono::{Days, Months, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Configuration error for recurrence input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    /// Pattern text is not one of daily/weekly/monthly/yearly.
    ///
    /// Callers must reject this before expansion; there is no fallback
    /// cadence.
    UnknownPattern(String),
}

impl Display for RecurrenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPattern(value) => write!(
                f,
                "unknown recurrence pattern `{value}`; expected daily|weekly|monthly|yearly"
            ),
        }
    }
}

impl Error for RecurrenceError {}

/// Parses pattern text from external input (storage, API payloads).
pub fn parse_pattern(value: &str) -> Result<RecurrencePattern, RecurrenceError> {
    match value {
        "daily" => Ok(RecurrencePattern::Daily),
        "weekly" => Ok(RecurrencePattern::Weekly),
        "monthly" => Ok(RecurrencePattern::Monthly),
        "yearly" => Ok(RecurrencePattern::Yearly),
        other => Err(RecurrenceError::UnknownPattern(other.to_string())),
    }
}

/// Advances a due date by `interval` steps of `pattern`.
///
/// Monthly and yearly steps clamp to the end of shorter months
/// (Jan 31 + 1 month = Feb 28/29).
pub fn advance(date: NaiveDate, pattern: RecurrencePattern, interval: u32) -> NaiveDate {
    let interval = interval.max(1);
    let stepped = match pattern {
        RecurrencePattern::Daily => date.checked_add_days(Days::new(u64::from(interval))),
        RecurrencePattern::Weekly => date.checked_add_days(Days::new(7 * u64::from(interval))),
        RecurrencePattern::Monthly => date.checked_add_months(Months::new(interval)),
        RecurrencePattern::Yearly => date.checked_add_months(Months::new(12 * interval)),
    };
    // chrono only fails near year +/-262143; stay put rather than wrap.
    stepped.unwrap_or(date)
}

/// Expands a template into its ordered batch of task instances.
///
/// One-shot templates (`is_recurring == false` or `recurrence_count <= 1`)
/// produce a single visible instance with no recurrence grouping id and an
/// unmodified title. Recurring templates produce `recurrence_count`
/// instances sharing a generated recurrence id: instance 1 uses the
/// template due date (or `today` when absent) and is visible, later
/// instances advance the previous due date by one pattern step and start
/// hidden. Instance i is titled `"{title} (i/N)"`.
pub fn expand(template: &TaskTemplate, today: NaiveDate) -> Vec<Task> {
    if !template.is_recurring || template.recurrence_count <= 1 {
        return vec![instance(template, template.title.clone(), None, 1, template.due_date, true)];
    }

    let recurrence_uuid = Uuid::new_v4();
    let count = template.recurrence_count;
    let mut due_date = template.due_date.unwrap_or(today);
    let mut instances = Vec::with_capacity(count as usize);

    for number in 1..=count {
        instances.push(instance(
            template,
            format!("{} ({number}/{count})", template.title),
            Some(recurrence_uuid),
            number,
            Some(due_date),
            number == 1,
        ));
        due_date = advance(due_date, template.recurring_pattern, template.recurring_interval);
    }

    instances
}

fn instance(
    template: &TaskTemplate,
    title: String,
    recurrence_uuid: Option<Uuid>,
    instance_number: u32,
    due_date: Option<NaiveDate>,
    is_visible: bool,
) -> Task {
    Task {
        uuid: Uuid::new_v4(),
        project_uuid: template.project_uuid,
        title,
        description: template.description.clone(),
        status: TaskStatus::Pending,
        priority: template.priority,
        due_date,
        recurrence_uuid,
        instance_number,
        is_visible,
    }
}
