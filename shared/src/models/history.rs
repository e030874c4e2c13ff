//! Session history of evaluated shots

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::bean::BeanProfile;
use super::shot::{ShotObservation, ShotStyle, Taste};

/// Flat summary of one evaluated shot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShotRecord {
    pub id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub bean: String,
    pub style: ShotStyle,
    pub grind: Decimal,
    pub dose_grams: Decimal,
    pub yield_grams: Decimal,
    pub time_seconds: Decimal,
    pub temperature_celsius: Decimal,
    pub taste: Taste,
}

impl ShotRecord {
    pub fn from_observation(
        bean: &BeanProfile,
        style: ShotStyle,
        observation: &ShotObservation,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at,
            bean: bean.name.clone(),
            style,
            grind: observation.grind,
            dose_grams: observation.dose_grams,
            yield_grams: observation.yield_grams,
            time_seconds: observation.time_seconds,
            temperature_celsius: observation.temperature_celsius,
            taste: observation.taste,
        }
    }
}

/// Append-only log of shots for the lifetime of a session.
///
/// Records are never mutated or removed once appended.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionHistory {
    records: Vec<ShotRecord>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: ShotRecord) -> &ShotRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    /// Records in append order
    pub fn records(&self) -> &[ShotRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&ShotRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
