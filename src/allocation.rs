//! Placement of new items' due dates so they do not pile up on the same week.

use crate::cadence::TrainingCadence;
use crate::config::SchedulerConfig;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Picks a due date for a single new item by bucketing the existing due
/// dates into fixed-width slots and choosing the emptiest one.
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    slot_width_days: i64,
    default_offset_days: i64,
    slot_midpoint_days: i64,
    once_window_days: i64,
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

impl SlotAllocator {
    /// Expects a config that passed `SchedulerConfig::validate`; a zero slot
    /// width is clamped to one day, other values are taken as given.
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            slot_width_days: config.slot_width_days.max(1),
            default_offset_days: config.default_offset_days,
            slot_midpoint_days: config.slot_midpoint_days,
            once_window_days: config.once_window_days,
        }
    }

    fn window_days(&self, cadence: TrainingCadence) -> i64 {
        match cadence {
            TrainingCadence::Once => self.once_window_days,
            other => other.interval_days(),
        }
    }

    /// Slot occupancy over `[0, window)` days from `now`. Dates outside the
    /// window, including past dates, are ignored.
    pub fn occupancy(
        &self,
        cadence: TrainingCadence,
        existing: &[DateTime<Utc>],
        now: DateTime<Utc>,
    ) -> Vec<usize> {
        let window = self.window_days(cadence);
        let num_slots = (window + self.slot_width_days - 1).div_euclid(self.slot_width_days);
        let mut counts = vec![0usize; num_slots.max(0) as usize];

        for date in existing {
            let days_from_now = (*date - now).num_milliseconds().div_euclid(MILLIS_PER_DAY);
            if (0..window).contains(&days_from_now) {
                let slot = (days_from_now / self.slot_width_days) as usize;
                counts[slot] += 1;
            }
        }
        counts
    }

    pub fn choose_date(
        &self,
        cadence: TrainingCadence,
        existing: &[DateTime<Utc>],
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        if existing.is_empty() {
            return now + Duration::days(self.default_offset_days);
        }

        let counts = self.occupancy(cadence, existing, now);

        // Slot 0 is never offered so there is always at least one slot of notice.
        let mut best_slot = 1usize;
        let mut best_count = usize::MAX;
        for (slot, count) in counts.iter().enumerate().skip(1) {
            if *count < best_count {
                best_slot = slot;
                best_count = *count;
            }
        }

        debug!(
            cadence = %cadence,
            slot = best_slot,
            occupancy = ?counts,
            "selected due-date slot"
        );

        let offset = best_slot as i64 * self.slot_width_days + self.slot_midpoint_days;
        now + Duration::days(offset)
    }
}

/// Spreads a batch of new items evenly across their cadence intervals.
#[derive(Debug, Clone)]
pub struct BulkSlotAllocator {
    base_offset_days: i64,
    once_stride_days: i64,
}

impl Default for BulkSlotAllocator {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

impl BulkSlotAllocator {
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            base_offset_days: config.default_offset_days,
            once_stride_days: config.once_stride_days,
        }
    }

    /// One date per input cadence, in input order.
    pub fn choose_dates(
        &self,
        cadences: &[TrainingCadence],
        now: DateTime<Utc>,
    ) -> Vec<DateTime<Utc>> {
        let mut totals: HashMap<TrainingCadence, i64> = HashMap::new();
        for cadence in cadences {
            *totals.entry(*cadence).or_insert(0) += 1;
        }

        let mut seen: HashMap<TrainingCadence, i64> = HashMap::new();
        let dates: Vec<DateTime<Utc>> = cadences
            .iter()
            .map(|cadence| {
                let index = seen.entry(*cadence).or_insert(0);
                let k = *index;
                *index += 1;

                let offset = if cadence.is_recurring() {
                    let total = totals.get(cadence).copied().unwrap_or(1).max(1);
                    let spacing = cadence.interval_days() / total;
                    self.base_offset_days + k * spacing
                } else {
                    self.base_offset_days + k * self.once_stride_days
                };
                now + Duration::days(offset)
            })
            .collect();

        debug!(count = dates.len(), groups = totals.len(), "placed bulk due dates");
        dates
    }
}
