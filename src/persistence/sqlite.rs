use super::{LibraryStore, PersistenceError, PersistenceResult};
use crate::{SchedulerConfig, TrainingItem, TrainingLibrary};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

pub struct SqliteLibraryStore {
    connection: Mutex<Connection>,
}

impl SqliteLibraryStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS library_config (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                config_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS training_items (
                position INTEGER PRIMARY KEY,
                item_id TEXT NOT NULL UNIQUE,
                item_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn lock(&self) -> PersistenceResult<std::sync::MutexGuard<'_, Connection>> {
        self.connection
            .lock()
            .map_err(|_| PersistenceError::InvalidData("sqlite connection lock poisoned".into()))
    }

    fn save_config(
        &self,
        tx: &rusqlite::Transaction,
        config: &SchedulerConfig,
    ) -> PersistenceResult<()> {
        let json = serde_json::to_string(config)?;
        tx.execute("DELETE FROM library_config", [])?;
        tx.execute(
            "INSERT INTO library_config (id, config_json) VALUES (1, ?1)",
            params![json],
        )?;
        Ok(())
    }

    fn save_items(
        &self,
        tx: &rusqlite::Transaction,
        library: &TrainingLibrary,
    ) -> PersistenceResult<()> {
        tx.execute("DELETE FROM training_items", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO training_items (position, item_id, item_json) VALUES (?1, ?2, ?3)",
        )?;
        for (position, item) in library.items().iter().enumerate() {
            let json = serde_json::to_string(item)?;
            stmt.execute(params![position as i64, item.id, json])?;
        }
        Ok(())
    }
}

impl LibraryStore for SqliteLibraryStore {
    fn save_library(&self, library: &TrainingLibrary) -> PersistenceResult<()> {
        super::validate_library(library)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        self.save_config(&tx, library.config())?;
        self.save_items(&tx, library)?;
        tx.commit()?;
        Ok(())
    }

    fn load_library(&self) -> PersistenceResult<Option<TrainingLibrary>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare("SELECT config_json FROM library_config WHERE id = 1")?;
        let config_json: Option<String> = stmt.query_row([], |row| row.get(0)).optional()?;

        let Some(config_json) = config_json else {
            return Ok(None);
        };

        let config: SchedulerConfig = serde_json::from_str(&config_json)?;

        let mut stmt = conn.prepare("SELECT item_json FROM training_items ORDER BY position ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut items = Vec::new();
        for json in rows {
            let json = json?;
            let item: TrainingItem = serde_json::from_str(&json)?;
            items.push(item);
        }

        super::library_from_items(config, items).map(Some)
    }
}
