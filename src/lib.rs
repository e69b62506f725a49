pub mod allocation;
pub mod cadence;
pub mod clock;
pub mod config;
pub mod due_date;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod item;
pub(crate) mod item_validation;
pub mod library;
pub mod persistence;

pub use allocation::{BulkSlotAllocator, SlotAllocator};
pub use cadence::TrainingCadence;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, SchedulerConfig};
pub use due_date::{ItemStatus, TrainingStatus, compare_status, evaluate, resolve};
pub use item::TrainingItem;
pub use item_validation::ItemValidationError;
pub use library::{LibraryError, TrainingLibrary};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteLibraryStore;
pub use persistence::{
    LibraryStore, PersistenceError, load_library_from_csv, load_library_from_json,
    save_library_to_csv, save_library_to_json, validate_items, validate_library,
};
