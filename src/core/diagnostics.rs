use crate::storage::table::FeatureTable;
use serde::Serialize;

/// Dimensions above this are more likely a malformed file than a real
/// feature (the widest built-in extractor produces 1024 values).
pub const MAX_PLAUSIBLE_DIMENSION: usize = 8192;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Corrupted(String),
    Suspicious(String),
}

/// Per-table summary printed by the inspector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub rows: usize,
    pub dimension: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub zero_norm_rows: usize,
}

pub struct Diagnostics;

impl Diagnostics {
    /// Corrupted beats Suspicious: a NaN anywhere is reported even when an
    /// earlier row is merely odd.
    pub fn check_health(table: &FeatureTable) -> HealthStatus {
        for vector in table.vectors() {
            if let Some(pos) = vector.values().iter().position(|v| !v.is_finite()) {
                return HealthStatus::Corrupted(format!(
                    "'{}' has a non-finite value at column {}",
                    vector.id(),
                    pos
                ));
            }
        }

        if table.dimension() > MAX_PLAUSIBLE_DIMENSION {
            return HealthStatus::Suspicious(format!("Unusually high dimension: {}", table.dimension()));
        }
        if let Some(vector) = table.vectors().iter().find(|v| v.values().iter().all(|&x| x == 0.0)) {
            return HealthStatus::Suspicious(format!("'{}' has zero norm and cannot be scored by cosine", vector.id()));
        }
        if let Some(vector) = table.vectors().iter().find(|v| v.values().iter().any(|&x| x < 0.0)) {
            return HealthStatus::Suspicious(format!("'{}' has a negative bin", vector.id()));
        }

        HealthStatus::Healthy
    }

    pub fn summarize(table: &FeatureTable) -> TableSummary {
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;
        let mut count = 0usize;
        let mut zero_norm_rows = 0;

        for vector in table.vectors() {
            if vector.values().iter().all(|&x| x == 0.0) {
                zero_norm_rows += 1;
            }
            for &v in vector.values() {
                min = min.min(v);
                max = max.max(v);
                sum += v as f64;
                count += 1;
            }
        }

        let mean = if count == 0 { 0.0 } else { (sum / count as f64) as f32 };
        if count == 0 {
            min = 0.0;
            max = 0.0;
        }

        TableSummary {
            rows: table.len(),
            dimension: table.dimension(),
            min,
            max,
            mean,
            zero_norm_rows,
        }
    }
}
