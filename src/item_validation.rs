use crate::item::TrainingItem;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone)]
pub struct ItemValidationError {
    message: String,
}

impl ItemValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ItemValidationError {}

fn label(item: &TrainingItem) -> String {
    match &item.id {
        Some(id) => format!("item {id}"),
        None => format!("item '{}'", item.name),
    }
}

pub fn validate_item(item: &TrainingItem) -> Result<(), ItemValidationError> {
    if item.name.trim().is_empty() {
        return Err(ItemValidationError::new(format!(
            "{} requires a non-empty name",
            label(item)
        )));
    }

    if let Some(id) = &item.id {
        if id.trim().is_empty() {
            return Err(ItemValidationError::new(format!(
                "item '{}' has a blank id",
                item.name
            )));
        }
    }

    if item.assigned_tags.iter().any(|tag| tag.contains(';')) {
        return Err(ItemValidationError::new(format!(
            "{} has a tag containing ';'",
            label(item)
        )));
    }

    Ok(())
}

pub fn validate_item_collection(items: &[TrainingItem]) -> Result<(), ItemValidationError> {
    let mut seen_ids = HashSet::with_capacity(items.len());
    for item in items {
        if let Some(id) = &item.id {
            if !seen_ids.insert(id.as_str()) {
                return Err(ItemValidationError::new(format!("duplicate item id {id}")));
            }
        }
        validate_item(item)?;
    }
    Ok(())
}
