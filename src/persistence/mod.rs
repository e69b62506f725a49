use crate::item_validation;
use crate::{TrainingItem, TrainingLibrary};
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait LibraryStore {
    fn save_library(&self, library: &TrainingLibrary) -> PersistenceResult<()>;
    fn load_library(&self) -> PersistenceResult<Option<TrainingLibrary>>;
}

pub fn validate_items(items: &[TrainingItem]) -> PersistenceResult<()> {
    item_validation::validate_item_collection(items)?;
    if let Some(item) = items.iter().find(|item| item.id.is_none()) {
        return Err(PersistenceError::InvalidData(format!(
            "item '{}' has no id",
            item.name
        )));
    }
    Ok(())
}

pub fn validate_library(library: &TrainingLibrary) -> PersistenceResult<()> {
    validate_items(library.items())
}

impl From<item_validation::ItemValidationError> for PersistenceError {
    fn from(value: item_validation::ItemValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

impl From<crate::LibraryError> for PersistenceError {
    fn from(value: crate::LibraryError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Rebuilds a library from already-validated records.
fn library_from_items(
    config: crate::SchedulerConfig,
    items: Vec<TrainingItem>,
) -> PersistenceResult<TrainingLibrary> {
    validate_items(&items)?;
    let mut library = TrainingLibrary::with_config(config)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;
    for item in items {
        library.upsert_item_record(item)?;
    }
    Ok(library)
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_library_from_csv, load_library_from_json, save_library_to_csv, save_library_to_json,
};
