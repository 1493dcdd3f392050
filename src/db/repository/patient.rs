use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::PatientScanRecord;

pub fn insert_record(conn: &Connection, record: &PatientScanRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, name, prediction, risk, change, confidence,
         scan_date, last_test, chart_data, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            record.id.to_string(),
            record.name,
            record.prediction,
            record.risk,
            record.change,
            record.confidence,
            encode_timestamp(&record.scan_date),
            record.last_test,
            serde_json::to_string(&record.chart_data).map_err(|e| {
                DatabaseError::CorruptField {
                    field: "chart_data",
                    reason: e.to_string(),
                }
            })?,
            encode_timestamp(&record.created_at),
            encode_timestamp(&record.updated_at),
        ],
    )?;
    Ok(())
}

/// All records for a name, newest scan first. Case-insensitive exact match
/// on the whitespace-trimmed name.
pub fn find_records_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Vec<PatientScanRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, prediction, risk, change, confidence,
         scan_date, last_test, chart_data, created_at, updated_at
         FROM patients WHERE LOWER(name) = LOWER(TRIM(?1))
         ORDER BY scan_date DESC",
    )?;

    let rows = stmt.query_map(params![name], |row| Ok(patient_row_from_rusqlite(row)))?;

    let mut records = Vec::new();
    for row in rows {
        records.push(record_from_row(row??)?);
    }
    Ok(records)
}

/// Most recent record for a name, if any.
pub fn find_latest_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<PatientScanRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, prediction, risk, change, confidence,
         scan_date, last_test, chart_data, created_at, updated_at
         FROM patients WHERE LOWER(name) = LOWER(TRIM(?1))
         ORDER BY scan_date DESC LIMIT 1",
    )?;

    let mut rows = stmt.query_map(params![name], |row| Ok(patient_row_from_rusqlite(row)))?;

    match rows.next() {
        Some(row) => Ok(Some(record_from_row(row??)?)),
        None => Ok(None),
    }
}

pub fn count_records(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}

/// Bulk reset, used by the seed tool only.
pub fn delete_all_records(conn: &Connection) -> Result<usize, DatabaseError> {
    let deleted = conn.execute("DELETE FROM patients", [])?;
    Ok(deleted)
}

// Internal row type for two-phase mapping
struct PatientRow {
    id: String,
    name: String,
    prediction: String,
    risk: i64,
    change: i64,
    confidence: f64,
    scan_date: String,
    last_test: String,
    chart_data: String,
    created_at: String,
    updated_at: String,
}

fn patient_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<PatientRow, rusqlite::Error> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        prediction: row.get(2)?,
        risk: row.get(3)?,
        change: row.get(4)?,
        confidence: row.get(5)?,
        scan_date: row.get(6)?,
        last_test: row.get(7)?,
        chart_data: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

fn record_from_row(row: PatientRow) -> Result<PatientScanRecord, DatabaseError> {
    Ok(PatientScanRecord {
        id: Uuid::from_str(&row.id).map_err(|e| DatabaseError::CorruptField {
            field: "id",
            reason: e.to_string(),
        })?,
        name: row.name,
        prediction: row.prediction,
        risk: row.risk,
        change: row.change,
        confidence: row.confidence,
        scan_date: decode_timestamp("scan_date", &row.scan_date)?,
        last_test: row.last_test,
        chart_data: serde_json::from_str(&row.chart_data).map_err(|e| {
            DatabaseError::CorruptField {
                field: "chart_data",
                reason: e.to_string(),
            }
        })?,
        created_at: decode_timestamp("created_at", &row.created_at)?,
        updated_at: decode_timestamp("updated_at", &row.updated_at)?,
    })
}

/// Fixed-width RFC 3339 so lexicographic ordering matches chronological.
fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptField {
            field,
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use chrono::Duration;

    fn record_named(name: &str) -> PatientScanRecord {
        PatientScanRecord::new(name, "Healthy", 10, 2, 0.1, vec![10, 20, 25, 15])
    }

    #[test]
    fn insert_then_find_round_trips() {
        let conn = open_memory_database().unwrap();
        let record = record_named("Aarav Sharma");
        insert_record(&conn, &record).unwrap();

        let found = find_records_by_name(&conn, "aarav sharma").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0], record);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let conn = open_memory_database().unwrap();
        // Constructor lowercases the stored name
        insert_record(&conn, &record_named("Aarav Sharma")).unwrap();

        let found = find_records_by_name(&conn, "AARAV SHARMA").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "aarav sharma");
    }

    #[test]
    fn lookup_trims_whitespace() {
        let conn = open_memory_database().unwrap();
        insert_record(&conn, &record_named("priya")).unwrap();

        let found = find_records_by_name(&conn, "  priya ").unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn lookup_matches_full_name_only() {
        let conn = open_memory_database().unwrap();
        insert_record(&conn, &record_named("aarav sharma")).unwrap();

        assert!(find_records_by_name(&conn, "aarav").unwrap().is_empty());
    }

    #[test]
    fn records_come_back_newest_first() {
        let conn = open_memory_database().unwrap();
        let mut older = record_named("rohan");
        older.scan_date = Utc::now() - Duration::days(30);
        older.prediction = "Healthy".into();
        let mut newer = record_named("rohan");
        newer.prediction = "Alzheimer's Disease (Early)".into();

        insert_record(&conn, &older).unwrap();
        insert_record(&conn, &newer).unwrap();

        let found = find_records_by_name(&conn, "rohan").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].prediction, "Alzheimer's Disease (Early)");
        assert_eq!(found[1].prediction, "Healthy");
    }

    #[test]
    fn latest_returns_most_recent_or_none() {
        let conn = open_memory_database().unwrap();
        assert!(find_latest_by_name(&conn, "nobody").unwrap().is_none());

        let mut older = record_named("ishita");
        older.scan_date = Utc::now() - Duration::days(7);
        let newer = record_named("ishita");
        insert_record(&conn, &older).unwrap();
        insert_record(&conn, &newer).unwrap();

        let latest = find_latest_by_name(&conn, "Ishita").unwrap().unwrap();
        assert_eq!(latest.id, newer.id);
    }

    #[test]
    fn same_name_accumulates_multiple_rows() {
        let conn = open_memory_database().unwrap();
        insert_record(&conn, &record_named("neha")).unwrap();
        insert_record(&conn, &record_named("neha")).unwrap();
        assert_eq!(count_records(&conn).unwrap(), 2);
    }

    #[test]
    fn delete_all_clears_the_table() {
        let conn = open_memory_database().unwrap();
        insert_record(&conn, &record_named("a")).unwrap();
        insert_record(&conn, &record_named("b")).unwrap();

        assert_eq!(delete_all_records(&conn).unwrap(), 2);
        assert_eq!(count_records(&conn).unwrap(), 0);
    }
}
