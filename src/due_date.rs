//! Due-date resolution and compliance status.

use crate::cadence::TrainingCadence;
use crate::item::TrainingItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Computes the next due date of an item.
///
/// A completed item is due one calendar interval after its last completion,
/// ignoring any scheduled date. An item never completed is due on its
/// scheduled date, or immediately when it has none. Completed `Once` items
/// have no next due date.
pub fn resolve(
    last_completed_at: Option<DateTime<Utc>>,
    cadence: TrainingCadence,
    scheduled_due_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if cadence == TrainingCadence::Once {
        if last_completed_at.is_some() {
            return None;
        }
        return Some(scheduled_due_date.unwrap_or(now));
    }

    if let Some(completed) = last_completed_at {
        return cadence.add_interval(completed);
    }

    Some(scheduled_due_date.unwrap_or(now))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrainingStatus {
    Overdue,
    DueSoon,
    NeverTrained,
    Current,
}

impl TrainingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingStatus::Overdue => "overdue",
            TrainingStatus::DueSoon => "dueSoon",
            TrainingStatus::NeverTrained => "neverTrained",
            TrainingStatus::Current => "current",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            TrainingStatus::Overdue => 0,
            TrainingStatus::DueSoon => 1,
            TrainingStatus::NeverTrained => 2,
            TrainingStatus::Current => 3,
        }
    }
}

/// Status snapshot of one item at a given instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStatus {
    pub id: Option<String>,
    pub name: String,
    pub cadence: TrainingCadence,
    pub status: TrainingStatus,
    pub next_due_date: Option<DateTime<Utc>>,
    pub days_until_due: Option<i64>,
}

/// Whole days from `now` until `due`, rounded up.
pub fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (due - now).num_milliseconds();
    -((-millis).div_euclid(MILLIS_PER_DAY))
}

pub fn evaluate(item: &TrainingItem, now: DateTime<Utc>, due_soon_days: i64) -> ItemStatus {
    let mut status = ItemStatus {
        id: item.id.clone(),
        name: item.name.clone(),
        cadence: item.cadence,
        status: TrainingStatus::Current,
        next_due_date: None,
        days_until_due: None,
    };

    if item.cadence == TrainingCadence::Once && item.is_completed() {
        return status;
    }

    let Some(next_due) = item.next_due_date(now) else {
        return status;
    };
    status.next_due_date = Some(next_due);

    let days = days_until(next_due, now);
    status.days_until_due = Some(days);
    status.status = if days < 0 {
        TrainingStatus::Overdue
    } else if days <= due_soon_days {
        TrainingStatus::DueSoon
    } else if !item.is_completed() {
        TrainingStatus::NeverTrained
    } else {
        TrainingStatus::Current
    };
    status
}

/// Most urgent first, then by due date, then by name.
pub fn compare_status(a: &ItemStatus, b: &ItemStatus) -> Ordering {
    a.status
        .rank()
        .cmp(&b.status.rank())
        .then_with(|| match (a.next_due_date, b.next_due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.name.cmp(&b.name))
}
