use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How often a training obligation recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum TrainingCadence {
    Once,
    Monthly,
    Quarterly,
    SemiAnnually,
    #[default]
    Annually,
}

impl TrainingCadence {
    pub const ALL: [TrainingCadence; 5] = [
        TrainingCadence::Once,
        TrainingCadence::Monthly,
        TrainingCadence::Quarterly,
        TrainingCadence::SemiAnnually,
        TrainingCadence::Annually,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingCadence::Once => "Once",
            TrainingCadence::Monthly => "Monthly",
            TrainingCadence::Quarterly => "Quarterly",
            TrainingCadence::SemiAnnually => "Semi-Annually",
            TrainingCadence::Annually => "Annually",
        }
    }

    /// Strict parse of a cadence label. Accepts the legacy expiration spellings.
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "once" => Some(TrainingCadence::Once),
            "monthly" | "montly" => Some(TrainingCadence::Monthly),
            "quarterly" => Some(TrainingCadence::Quarterly),
            "semi-annually" | "semiannually" | "semi_annually" | "semi-anually" => {
                Some(TrainingCadence::SemiAnnually)
            }
            "annually" | "anually" => Some(TrainingCadence::Annually),
            _ => None,
        }
    }

    /// Lenient parse: anything unrecognized is treated as `Annually`.
    pub fn parse_lenient(value: &str) -> Self {
        Self::from_str(value).unwrap_or_default()
    }

    /// Nominal interval length in days. Used for slot windows and bulk spacing.
    pub fn interval_days(&self) -> i64 {
        match self {
            TrainingCadence::Once => 0,
            TrainingCadence::Monthly => 30,
            TrainingCadence::Quarterly => 90,
            TrainingCadence::SemiAnnually => 180,
            TrainingCadence::Annually => 365,
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, TrainingCadence::Once)
    }

    /// Calendar months covered by one interval; `None` for `Once`.
    fn interval_months(&self) -> Option<u32> {
        match self {
            TrainingCadence::Once => None,
            TrainingCadence::Monthly => Some(1),
            TrainingCadence::Quarterly => Some(3),
            TrainingCadence::SemiAnnually => Some(6),
            TrainingCadence::Annually => Some(12),
        }
    }

    /// Adds one calendar interval to `from`.
    ///
    /// Month arithmetic clamps to the last day of shorter months, so
    /// 2024-01-31 plus one month is 2024-02-29. `Once` returns `from`
    /// unchanged. Overflow yields `None`.
    pub fn add_interval(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.interval_months() {
            Some(months) => from.checked_add_months(Months::new(months)),
            None => Some(from),
        }
    }
}

impl fmt::Display for TrainingCadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for TrainingCadence {
    fn from(value: String) -> Self {
        Self::parse_lenient(&value)
    }
}

impl From<TrainingCadence> for String {
    fn from(value: TrainingCadence) -> Self {
        value.as_str().to_string()
    }
}
