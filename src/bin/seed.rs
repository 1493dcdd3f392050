//! Sample-data seeding tool.
//!
//! Clears the patients table and inserts a fixed set of demo patients so
//! the frontend has something to chart. Run with the same `DATABASE_PATH`
//! as the server:
//!
//! ```text
//! DATABASE_PATH=neuroscan.db cargo run --bin seed
//! ```

use chrono::{NaiveDate, NaiveTime, Utc};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use neuroscan::config::{self, Config};
use neuroscan::db::{open_database, repository};
use neuroscan::models::PatientScanRecord;

struct SeedPatient {
    name: &'static str,
    prediction: &'static str,
    risk: i64,
    change: i64,
    last_test: &'static str,
    chart_data: &'static [i64],
}

const SEED_PATIENTS: &[SeedPatient] = &[
    SeedPatient { name: "Aarav Sharma", prediction: "Healthy", risk: 10, change: 2, last_test: "2025-11-01", chart_data: &[10, 20, 25, 15, 18] },
    SeedPatient { name: "Priya Mehta", prediction: "Mild Cognitive Impairment", risk: 30, change: 5, last_test: "2025-10-28", chart_data: &[30, 35, 40, 38, 42] },
    SeedPatient { name: "Rohan Gupta", prediction: "Alzheimer's Disease (Early)", risk: 45, change: 7, last_test: "2025-09-22", chart_data: &[45, 48, 50, 55, 60] },
    SeedPatient { name: "Ishita Verma", prediction: "Healthy", risk: 12, change: 1, last_test: "2025-10-10", chart_data: &[12, 13, 11, 10, 14] },
    SeedPatient { name: "Aditya Singh", prediction: "Alzheimer's Disease (Moderate)", risk: 65, change: 8, last_test: "2025-11-05", chart_data: &[60, 63, 65, 68, 70] },
    SeedPatient { name: "Neha Patel", prediction: "Healthy", risk: 8, change: 0, last_test: "2025-08-15", chart_data: &[8, 9, 7, 10, 8] },
    SeedPatient { name: "Karan Jain", prediction: "Mild Cognitive Impairment", risk: 35, change: 4, last_test: "2025-10-02", chart_data: &[30, 33, 35, 36, 37] },
    SeedPatient { name: "Ananya Rao", prediction: "Alzheimer's Disease (Advanced)", risk: 80, change: 10, last_test: "2025-09-30", chart_data: &[75, 77, 78, 80, 82] },
    SeedPatient { name: "Manav Kapoor", prediction: "Healthy", risk: 15, change: 2, last_test: "2025-10-19", chart_data: &[10, 12, 14, 15, 16] },
    SeedPatient { name: "Simran Kaur", prediction: "Mild Cognitive Impairment", risk: 40, change: 3, last_test: "2025-10-25", chart_data: &[38, 39, 40, 42, 41] },
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    let config = Config::from_env()?;
    let conn = open_database(&config.database_path)?;

    let cleared = repository::delete_all_records(&conn)?;
    tracing::info!(cleared, "cleared old data");

    for seed in SEED_PATIENTS {
        let record = seed_record(seed)?;
        repository::insert_record(&conn, &record)?;
    }

    tracing::info!(
        inserted = SEED_PATIENTS.len(),
        path = %config.database_path.display(),
        "inserted sample patients"
    );
    Ok(())
}

fn seed_record(seed: &SeedPatient) -> Result<PatientScanRecord, chrono::ParseError> {
    // Anchor the scan timestamp to the last-test date so seeded timelines
    // come out in a sensible chronological order.
    let scan_date = NaiveDate::parse_from_str(seed.last_test, "%Y-%m-%d")?
        .and_time(NaiveTime::MIN)
        .and_utc();
    let now = Utc::now();

    Ok(PatientScanRecord {
        id: Uuid::new_v4(),
        name: seed.name.trim().to_lowercase(),
        prediction: seed.prediction.to_string(),
        risk: seed.risk,
        change: seed.change,
        confidence: 0.0,
        scan_date,
        last_test: seed.last_test.to_string(),
        chart_data: seed.chart_data.to_vec(),
        created_at: now,
        updated_at: now,
    })
}
