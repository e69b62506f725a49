use crate::allocation::{BulkSlotAllocator, SlotAllocator};
use crate::config::{ConfigError, SchedulerConfig};
use crate::due_date::{self, ItemStatus};
use crate::item::TrainingItem;
use crate::item_validation::{self, ItemValidationError};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;
use tracing::info;

#[derive(Debug, Clone)]
pub enum LibraryError {
    NotFound(String),
    DuplicateId(String),
    Validation(ItemValidationError),
}

impl fmt::Display for LibraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryError::NotFound(id) => write!(f, "item {id} not found"),
            LibraryError::DuplicateId(id) => write!(f, "item {id} already exists"),
            LibraryError::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for LibraryError {}

impl From<ItemValidationError> for LibraryError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Training items of one team, plus the settings used to place new ones.
#[derive(Debug, Clone, Default)]
pub struct TrainingLibrary {
    items: Vec<TrainingItem>,
    config: SchedulerConfig,
    /// Highest numeric id ever held, so removed ids are not handed out again.
    last_numeric_id: u64,
}

impl TrainingLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            items: Vec::new(),
            config,
            last_numeric_id: 0,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn items(&self) -> &[TrainingItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find_item(&self, id: &str) -> Option<&TrainingItem> {
        self.items.iter().find(|item| item.id.as_deref() == Some(id))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.id.as_deref() == Some(id))
    }

    fn note_id(&mut self, id: &str) {
        if let Ok(numeric) = id.parse::<u64>() {
            self.last_numeric_id = self.last_numeric_id.max(numeric);
        }
    }

    fn next_id(&self, reserved: &HashSet<String>) -> String {
        let reserved_max = reserved
            .iter()
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let mut candidate = self.last_numeric_id.max(reserved_max) + 1;
        loop {
            let id = candidate.to_string();
            if self.find_item(&id).is_none() && !reserved.contains(&id) {
                return id;
            }
            candidate += 1;
        }
    }

    /// Resolved due dates of every item, skipping items with none.
    pub fn resolved_due_dates(&self, now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        self.items
            .iter()
            .filter_map(|item| item.next_due_date(now))
            .collect()
    }

    /// Inserts a new item, assigning its id and, if it has never been
    /// scheduled or completed, a due date balanced against existing items.
    pub fn add_item(
        &mut self,
        mut item: TrainingItem,
        now: DateTime<Utc>,
    ) -> Result<&TrainingItem, LibraryError> {
        item_validation::validate_item(&item)?;
        match &item.id {
            Some(id) if self.find_item(id).is_some() => {
                return Err(LibraryError::DuplicateId(id.clone()));
            }
            Some(_) => {}
            None => item.id = Some(self.next_id(&HashSet::new())),
        }
        item.created_at.get_or_insert(now);

        if item.scheduled_due_date.is_none() && !item.is_completed() {
            let existing = self.resolved_due_dates(now);
            let allocator = SlotAllocator::from_config(&self.config);
            item.scheduled_due_date = Some(allocator.choose_date(item.cadence, &existing, now));
        }

        info!(
            id = item.id.as_deref().unwrap_or_default(),
            cadence = %item.cadence,
            due = ?item.scheduled_due_date,
            "added training item"
        );
        if let Some(id) = item.id.clone() {
            self.note_id(&id);
        }
        self.items.push(item);
        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    /// Inserts a batch. Unscheduled items are spread out together rather
    /// than one at a time. Nothing is inserted if any item is rejected.
    pub fn add_items(
        &mut self,
        items: Vec<TrainingItem>,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, LibraryError> {
        let mut reserved = HashSet::with_capacity(items.len());
        let mut prepared = Vec::with_capacity(items.len());
        for mut item in items {
            item_validation::validate_item(&item)?;
            match &item.id {
                Some(id) if self.find_item(id).is_some() || reserved.contains(id) => {
                    return Err(LibraryError::DuplicateId(id.clone()));
                }
                Some(_) => {}
                None => item.id = Some(self.next_id(&reserved)),
            }
            if let Some(id) = &item.id {
                reserved.insert(id.clone());
            }
            item.created_at.get_or_insert(now);
            prepared.push(item);
        }

        let pending: Vec<usize> = prepared
            .iter()
            .enumerate()
            .filter(|(_, item)| item.scheduled_due_date.is_none() && !item.is_completed())
            .map(|(idx, _)| idx)
            .collect();
        let cadences: Vec<_> = pending.iter().map(|idx| prepared[*idx].cadence).collect();
        let dates = BulkSlotAllocator::from_config(&self.config).choose_dates(&cadences, now);
        for (idx, date) in pending.into_iter().zip(dates) {
            prepared[idx].scheduled_due_date = Some(date);
        }

        let ids: Vec<String> = prepared.iter().filter_map(|item| item.id.clone()).collect();
        info!(count = ids.len(), "added training items in bulk");
        for id in &ids {
            self.note_id(id);
        }
        self.items.extend(prepared);
        Ok(ids)
    }

    /// Marks an item as trained at `completed_at`.
    pub fn record_completion(
        &mut self,
        id: &str,
        completed_at: DateTime<Utc>,
    ) -> Result<&TrainingItem, LibraryError> {
        let idx = self
            .position(id)
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))?;
        self.items[idx].last_completed_at = Some(completed_at);
        info!(id, completed_at = %completed_at, "recorded training completion");
        Ok(&self.items[idx])
    }

    pub fn remove_item(&mut self, id: &str) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Inserts or replaces an item by id without scheduling it.
    pub fn upsert_item_record(&mut self, item: TrainingItem) -> Result<(), LibraryError> {
        item_validation::validate_item(&item)?;
        let Some(id) = item.id.clone() else {
            return Err(LibraryError::Validation(ItemValidationError::new(format!(
                "item '{}' has no id",
                item.name
            ))));
        };
        self.note_id(&id);
        match self.position(&id) {
            Some(idx) => self.items[idx] = item,
            None => self.items.push(item),
        }
        Ok(())
    }

    /// Status of every item, most urgent first.
    pub fn statuses(&self, now: DateTime<Utc>) -> Vec<ItemStatus> {
        let mut statuses: Vec<ItemStatus> = self
            .items
            .iter()
            .map(|item| due_date::evaluate(item, now, self.config.due_soon_days))
            .collect();
        statuses.sort_by(due_date::compare_status);
        statuses
    }
}
