//! Normalization of raw model output into stored record fields.
//!
//! The model service returns a label, a confidence in [0,1] and an optional
//! per-class probability vector. Everything the frontend charts is derived
//! here: an integer risk percentage, a signed trend delta between the two
//! leading classes, rounded per-class percentages, and a categorical class
//! index for the timeline graph.

/// Chart placeholder when the model supplies no probability vector.
pub const CHART_PLACEHOLDER: [i64; 4] = [25, 25, 25, 25];

/// Sentinel class index when no class can be inferred.
pub const CLASS_UNKNOWN: i64 = -1;

/// Fallback mapping from free-text prediction labels to class indices.
///
/// Used only when a record has no usable chart data. First match wins, so
/// the more specific "cognitively normal" precedes the bare "normal".
/// Lossy by construction: labels matching nothing stay [`CLASS_UNKNOWN`].
const LABEL_KEYWORDS: &[(&str, i64)] = &[
    ("alzheimer", 0),
    ("cognitively normal", 1),
    ("normal", 1),
    ("emci", 2),
    ("early mild", 2),
    ("lmci", 3),
    ("late mild", 3),
];

/// Risk percentage derived from model confidence.
pub fn risk_percent(confidence: f64) -> i64 {
    (confidence * 100.0).round() as i64
}

/// Signed delta between the two leading class probabilities, as a percentage.
/// Zero when fewer than two probabilities are present.
pub fn change_score(probabilities: &[f64]) -> i64 {
    match probabilities {
        [first, second, ..] => ((first - second) * 100.0).round() as i64,
        _ => 0,
    }
}

/// Per-class percentages for charting, or the flat placeholder when the
/// model returned no probabilities.
pub fn chart_percentages(probabilities: &[f64]) -> Vec<i64> {
    if probabilities.is_empty() {
        return CHART_PLACEHOLDER.to_vec();
    }
    probabilities
        .iter()
        .map(|p| (p * 100.0).round() as i64)
        .collect()
}

/// Categorical class index for a record.
///
/// With at least four chart entries this is the position of the maximum
/// among the first four (ties resolve to the earliest position). Otherwise
/// the prediction label is matched against [`LABEL_KEYWORDS`].
pub fn class_index(chart_data: &[i64], prediction: &str) -> i64 {
    if chart_data.len() >= 4 {
        let mut best = 0;
        for (i, value) in chart_data[..4].iter().enumerate() {
            if *value > chart_data[best] {
                best = i;
            }
        }
        return best as i64;
    }

    let label = prediction.to_lowercase();
    LABEL_KEYWORDS
        .iter()
        .find(|(keyword, _)| label.contains(keyword))
        .map(|(_, index)| *index)
        .unwrap_or(CLASS_UNKNOWN)
}
