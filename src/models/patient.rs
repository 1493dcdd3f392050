use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One diagnostic event for a named patient.
///
/// Records are insert-only: each successful prediction (or manual entry)
/// appends a new row, and a patient's history is the set of rows sharing a
/// name. Names are stored lowercase; lookups are case-insensitive anyway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientScanRecord {
    pub id: Uuid,
    pub name: String,
    pub prediction: String,
    /// Integer percentage derived from model confidence, 0–100.
    pub risk: i64,
    /// Signed delta between the two leading class probabilities.
    pub change: i64,
    pub confidence: f64,
    pub scan_date: DateTime<Utc>,
    /// Calendar date string (YYYY-MM-DD), kept for display compatibility.
    pub last_test: String,
    /// Per-class percentages for charting; never empty.
    pub chart_data: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PatientScanRecord {
    /// Build a record from normalized model output, timestamped now.
    pub fn new(
        name: &str,
        prediction: &str,
        risk: i64,
        change: i64,
        confidence: f64,
        chart_data: Vec<i64>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_lowercase(),
            prediction: prediction.to_string(),
            risk,
            change,
            confidence,
            scan_date: now,
            last_test: now.format("%Y-%m-%d").to_string(),
            chart_data,
            created_at: now,
            updated_at: now,
        }
    }
}
