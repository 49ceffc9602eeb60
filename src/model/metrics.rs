//! Regression scores and the per-algorithm metrics record written after training.

use crate::model::error::ModelError;
use linfa::prelude::SingleTargetRegression;
use ndarray::Array1;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
}

impl RegressionMetrics {
    /// Scores `predicted` against `actual`. With a constant `actual`, R² is 1
    /// for a perfect fit and 0 otherwise.
    pub fn evaluate(actual: &Array1<f64>, predicted: &Array1<f64>) -> Result<Self, ModelError> {
        let mae = predicted.mean_absolute_error(actual)?;
        let mse = predicted.mean_squared_error(actual)?;
        let constant = actual
            .iter()
            .next()
            .map_or(true, |first| actual.iter().all(|a| a == first));
        let r2 = if !constant {
            predicted.r2(actual)?
        } else if mse == 0.0 {
            1.0
        } else {
            0.0
        };
        Ok(Self {
            mae,
            rmse: mse.sqrt(),
            r2,
        })
    }
}

/// Metrics for every evaluated algorithm, in evaluation order. Serializes as
/// a JSON object `{ "<name>": { "MAE": .., "RMSE": .., "R2": .. }, .. }`
/// whose key order follows evaluation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsRecord {
    entries: Vec<(String, RegressionMetrics)>,
}

impl MetricsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, metrics: RegressionMetrics) {
        self.entries.push((name.into(), metrics));
    }

    pub fn get(&self, name: &str) -> Option<&RegressionMetrics> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegressionMetrics)> {
        self.entries.iter().map(|(n, m)| (n.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the highest R². Earlier entries win ties; NaN scores never win.
    pub fn best(&self) -> Option<(&str, &RegressionMetrics)> {
        let mut best: Option<(&str, &RegressionMetrics)> = None;
        for (name, metrics) in self.iter() {
            if metrics.r2.is_nan() {
                continue;
            }
            match best {
                Some((_, current)) if metrics.r2 <= current.r2 => {}
                _ => best = Some((name, metrics)),
            }
        }
        best
    }
}

impl Serialize for MetricsRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, metrics) in &self.entries {
            map.serialize_entry(name, metrics)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MetricsRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = MetricsRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of model name to metrics")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut record = MetricsRecord::new();
                while let Some((name, metrics)) =
                    access.next_entry::<String, RegressionMetrics>()?
                {
                    record.push(name, metrics);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}
