//! Prediction proxy endpoint: upload, model call, stored record.
//!
//! `POST /api/predict` receives a multipart body with an `image` file and a
//! `name` field, forwards the image to the model service, normalizes the
//! response and appends a scan record for the patient.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::models::PatientScanRecord;
use crate::scoring;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub message: &'static str,
    pub prediction: String,
    pub confidence: f64,
    pub risk: i64,
    pub change: i64,
    pub chart_data: Vec<i64>,
    /// The record as constructed; may be unpersisted if the save failed.
    pub patient: PatientScanRecord,
}

/// `POST /api/predict` — run one scan through the model and record it.
///
/// The upload is buffered in memory (under the router's body limit) and
/// dropped on every exit path, so no temp file can leak. Persistence is
/// best-effort by design: a failed insert is logged and the model-derived
/// response is still returned.
pub async fn predict(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut patient_name: Option<String> = None;
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "name" => {
                patient_name = field.text().await.ok();
            }
            "image" => {
                let file_name = field.file_name().unwrap_or("scan").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read file data: {e}"))
                })?;
                image = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (file_name, bytes) = image.ok_or_else(|| {
        ApiError::BadRequest(
            "No file uploaded. Send multipart form-data with field 'image'.".into(),
        )
    })?;

    let result = ctx
        .model
        .predict(&file_name, bytes)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let confidence = result.confidence.unwrap_or(0.0);
    let probabilities = result.probabilities.unwrap_or_default();
    let prediction = result.prediction.unwrap_or_else(|| "Unknown".to_string());

    let risk = scoring::risk_percent(confidence);
    let change = scoring::change_score(&probabilities);
    let chart_data = scoring::chart_percentages(&probabilities);

    tracing::debug!(
        prediction = %prediction,
        confidence,
        probabilities = probabilities.len(),
        "model summary"
    );

    let record = PatientScanRecord::new(
        patient_name.as_deref().unwrap_or("unknown"),
        &prediction,
        risk,
        change,
        confidence,
        chart_data.clone(),
    );

    // Best-effort persistence: the response is built from model output
    // either way, so a store failure degrades durability, not the reply.
    match ctx.store.with(|conn| repository::insert_record(conn, &record)) {
        Ok(()) => {
            tracing::info!(
                patient = %record.name,
                prediction = %record.prediction,
                risk = record.risk,
                "saved new patient scan"
            );
        }
        Err(e) => {
            tracing::warn!(
                patient = %record.name,
                error = %e,
                "patient save failed, returning model result anyway"
            );
        }
    }

    Ok(Json(PredictResponse {
        message: "Prediction completed and saved!",
        prediction,
        confidence,
        risk,
        change,
        chart_data,
        patient: record,
    }))
}
