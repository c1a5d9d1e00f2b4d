use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub min: f64,
    pub max: f64,
}

/// Per-feature min/max fitted once on a training set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub ranges: Vec<FeatureRange>,
}

impl NormalizationParams {
    pub fn fit<V: AsRef<[f64]>>(rows: &[V]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(EngineError::invalid("cannot fit normalization on an empty dataset"));
        };
        let width = first.as_ref().len();
        if width == 0 {
            return Err(EngineError::invalid("feature vectors are empty"));
        }

        let mut ranges = vec![
            FeatureRange {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            };
            width
        ];
        for (idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                return Err(EngineError::invalid(format!(
                    "row {idx} has {} features, expected {width}",
                    row.len()
                )));
            }
            for (range, v) in ranges.iter_mut().zip(row) {
                range.min = range.min.min(*v);
                range.max = range.max.max(*v);
            }
        }
        Ok(Self { ranges })
    }

    /// Scales into [0, 1] relative to the fitted range. Values outside the
    /// range are not clamped. A feature with no spread maps to 0.5.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.ranges.len() {
            return Err(EngineError::invalid(format!(
                "expected {} features, got {}",
                self.ranges.len(),
                row.len()
            )));
        }
        Ok(self
            .ranges
            .iter()
            .zip(row)
            .map(|(r, x)| {
                let span = r.max - r.min;
                if span == 0.0 { 0.5 } else { (x - r.min) / span }
            })
            .collect())
    }

    pub fn transform_all<V: AsRef<[f64]>>(&self, rows: &[V]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|r| self.transform(r.as_ref())).collect()
    }
}
