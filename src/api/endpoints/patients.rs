//! Patient history and record endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::PatientScanRecord;
use crate::scoring;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub name: String,
    pub total_scans: usize,
    pub latest_scan: LatestScan,
    pub timeline: Vec<TimelinePoint>,
    /// All records, reordered oldest-first like the timeline.
    pub all_records: Vec<PatientScanRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestScan {
    pub prediction: String,
    pub risk: i64,
    pub change: i64,
    pub confidence: f64,
    pub date: DateTime<Utc>,
    pub last_test: String,
    pub chart_data: Vec<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    /// Short display date, e.g. "Nov 5".
    pub date: String,
    pub risk: i64,
    pub prediction: String,
    pub confidence: f64,
    pub full_date: DateTime<Utc>,
    pub class_index: i64,
}

/// `GET /api/patient/:name/history` — latest scan plus chronological timeline.
pub async fn history(
    State(ctx): State<ApiContext>,
    Path(name): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let mut records = ctx
        .store
        .with(|conn| repository::find_records_by_name(conn, name.trim()))?;

    let Some(latest) = records.first().cloned() else {
        return Err(ApiError::NotFound(
            "No records found for this patient".into(),
        ));
    };

    let total_scans = records.len();

    // Store order is newest-first; the chart wants oldest-first.
    records.reverse();

    let timeline = records
        .iter()
        .map(|record| TimelinePoint {
            date: record.scan_date.format("%b %-d").to_string(),
            risk: record.risk,
            prediction: record.prediction.clone(),
            confidence: record.confidence,
            full_date: record.scan_date,
            class_index: scoring::class_index(&record.chart_data, &record.prediction),
        })
        .collect();

    Ok(Json(HistoryResponse {
        name: latest.name.clone(),
        total_scans,
        latest_scan: LatestScan {
            prediction: latest.prediction,
            risk: latest.risk,
            change: latest.change,
            confidence: latest.confidence,
            date: latest.scan_date,
            last_test: latest.last_test,
            chart_data: latest.chart_data,
        },
        timeline,
        all_records: records,
    }))
}

/// `GET /api/patient/:name` — the single most recent record.
pub async fn latest(
    State(ctx): State<ApiContext>,
    Path(name): Path<String>,
) -> Result<Json<PatientScanRecord>, ApiError> {
    let record = ctx
        .store
        .with(|conn| repository::find_latest_by_name(conn, name.trim()))?;

    match record {
        Some(record) => Ok(Json(record)),
        None => Err(ApiError::NotFound("Patient not found".into())),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub name: Option<String>,
    pub prediction: Option<String>,
    pub risk: Option<i64>,
    pub change: Option<i64>,
    pub last_test: Option<String>,
    pub chart_data: Option<Vec<i64>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientResponse {
    pub message: &'static str,
    pub new_patient: PatientScanRecord,
}

/// `POST /api/patient` — manual record creation; every field is required.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(body): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<CreatePatientResponse>), ApiError> {
    let (Some(name), Some(prediction), Some(risk), Some(change), Some(last_test), Some(chart_data)) = (
        body.name,
        body.prediction,
        body.risk,
        body.change,
        body.last_test,
        body.chart_data,
    ) else {
        return Err(ApiError::BadRequest("All fields are required".into()));
    };

    let now = Utc::now();
    let record = PatientScanRecord {
        id: Uuid::new_v4(),
        name: name.trim().to_lowercase(),
        prediction,
        risk,
        change,
        confidence: 0.0,
        scan_date: now,
        last_test,
        chart_data,
        created_at: now,
        updated_at: now,
    };

    ctx.store
        .with(|conn| repository::insert_record(conn, &record))?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePatientResponse {
            message: "Patient data added successfully",
            new_patient: record,
        }),
    ))
}
