use super::PersistenceResult;
use crate::{SchedulerConfig, TrainingCadence, TrainingItem, TrainingLibrary};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::warn;

#[derive(Serialize, Deserialize)]
struct LibrarySnapshot {
    #[serde(default)]
    config: SchedulerConfig,
    items: Vec<TrainingItem>,
}

impl LibrarySnapshot {
    fn from_library(library: &TrainingLibrary) -> PersistenceResult<Self> {
        super::validate_library(library)?;
        Ok(Self {
            config: library.config().clone(),
            items: library.items().to_vec(),
        })
    }

    fn into_library(self) -> PersistenceResult<TrainingLibrary> {
        super::library_from_items(self.config, self.items)
    }
}

pub fn save_library_to_json<P: AsRef<Path>>(
    library: &TrainingLibrary,
    path: P,
) -> PersistenceResult<()> {
    let snapshot = LibrarySnapshot::from_library(library)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_library_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<TrainingLibrary> {
    let file = File::open(path)?;
    let snapshot: LibrarySnapshot = serde_json::from_reader(file)?;
    snapshot.into_library()
}

const CSV_HEADERS: [&str; 9] = [
    "id",
    "name",
    "topic",
    "team_id",
    "assigned_tags",
    "cadence",
    "created_at",
    "last_completed_at",
    "scheduled_due_date",
];

#[derive(Serialize, Deserialize)]
struct ItemCsvRecord {
    id: String,
    name: String,
    topic: String,
    team_id: String,
    assigned_tags: String,
    cadence: String,
    created_at: String,
    last_completed_at: String,
    scheduled_due_date: String,
}

impl From<&TrainingItem> for ItemCsvRecord {
    fn from(item: &TrainingItem) -> Self {
        Self {
            id: item.id.clone().unwrap_or_default(),
            name: item.name.clone(),
            topic: item.topic.clone().unwrap_or_default(),
            team_id: item.team_id.clone().unwrap_or_default(),
            assigned_tags: item.assigned_tags.join(";"),
            cadence: item.cadence.as_str().to_string(),
            created_at: format_timestamp(item.created_at),
            last_completed_at: format_timestamp(item.last_completed_at),
            scheduled_due_date: format_timestamp(item.scheduled_due_date),
        }
    }
}

impl ItemCsvRecord {
    fn into_item(self) -> TrainingItem {
        let cadence = match TrainingCadence::from_str(&self.cadence) {
            Some(cadence) => cadence,
            None => {
                warn!(
                    id = %self.id,
                    cadence = %self.cadence,
                    "unrecognized cadence, treating as Annually"
                );
                TrainingCadence::Annually
            }
        };
        let mut item = TrainingItem::new(self.name, cadence);
        item.id = parse_string_option(self.id);
        item.topic = parse_string_option(self.topic);
        item.team_id = parse_string_option(self.team_id);
        item.assigned_tags = split_strings(&self.assigned_tags);
        item.created_at = parse_timestamp("created_at", &self.created_at);
        item.last_completed_at = parse_timestamp("last_completed_at", &self.last_completed_at);
        item.scheduled_due_date = parse_timestamp("scheduled_due_date", &self.scheduled_due_date);
        item
    }
}

pub fn save_library_to_csv<P: AsRef<Path>>(
    library: &TrainingLibrary,
    path: P,
) -> PersistenceResult<()> {
    super::validate_library(library)?;
    let file = File::create(path)?;
    // Header written by hand so an empty library still yields a loadable file.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(CSV_HEADERS)?;
    for item in library.items() {
        writer.serialize(ItemCsvRecord::from(item))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_library_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<TrainingLibrary> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut items = Vec::new();
    for record in reader.deserialize::<ItemCsvRecord>() {
        let record = record?;
        items.push(record.into_item());
    }

    // CSV carries no settings, so the defaults apply.
    super::library_from_items(SchedulerConfig::default(), items)
}

fn format_timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map(|ts| ts.to_rfc3339()).unwrap_or_default()
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC). Anything else is
/// logged and treated as absent.
fn parse_timestamp(field: &str, input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    warn!(field, value = trimmed, "malformed timestamp, treating as absent");
    None
}

fn split_strings(input: &str) -> Vec<String> {
    if input.trim().is_empty() {
        return Vec::new();
    }
    input
        .split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_timestamp_accepts_plain_dates() {
        let parsed = parse_timestamp("f", "2025-04-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parse_timestamp_treats_garbage_as_absent() {
        assert_eq!(parse_timestamp("f", "not a date"), None);
        assert_eq!(parse_timestamp("f", "  "), None);
    }

    #[test]
    fn split_strings_drops_empty_segments() {
        assert_eq!(split_strings("ppe; ;ladders"), vec!["ppe", "ladders"]);
    }
}
