use serde::{Deserialize, Serialize};

use super::{check_threshold, default_threshold, verdict_for, Classifier, ModelError, Verdict};
use crate::scoring::features::FeatureVector;

/// Per-column standardization fitted alongside the model: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn validate(&self, width: usize) -> Result<(), ModelError> {
        if self.mean.len() != width || self.scale.len() != width {
            return Err(ModelError::Invalid(format!(
                "scaler has {} means and {} scales for {width} features",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if let Some(index) = self
            .scale
            .iter()
            .position(|scale| !scale.is_finite() || *scale == 0.0)
        {
            return Err(ModelError::Invalid(format!(
                "scaler scale for feature {index} must be finite and non-zero"
            )));
        }
        Ok(())
    }

    fn transform(&self, index: usize, value: f64) -> Option<f64> {
        let mean = self.mean.get(index)?;
        let scale = self.scale.get(index)?;
        Some((value - mean) / scale)
    }
}

/// Binary logistic regression over the schema columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl LogisticRegression {
    pub fn validate(&self, width: usize) -> Result<(), ModelError> {
        if self.coefficients.len() != width {
            return Err(ModelError::Invalid(format!(
                "{} coefficients supplied for {width} features",
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Invalid(
                "coefficients and intercept must be finite".to_string(),
            ));
        }
        if let Some(scaler) = &self.scaler {
            scaler.validate(width)?;
        }
        check_threshold(self.threshold)
    }

    /// Log-odds of approval. Fails when `features` does not match the fitted
    /// width.
    pub fn decision_function(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.coefficients.len() {
            return Err(ModelError::Invalid(format!(
                "{} coefficients supplied for {} features",
                self.coefficients.len(),
                features.len()
            )));
        }

        let mut weighted = 0.0;
        for (index, (value, weight)) in features.iter().zip(&self.coefficients).enumerate() {
            let value = match &self.scaler {
                Some(scaler) => scaler.transform(index, *value).ok_or_else(|| {
                    ModelError::Invalid(format!("scaler has no entry for feature {index}"))
                })?,
                None => *value,
            };
            weighted += value * weight;
        }
        Ok(weighted + self.intercept)
    }

    pub fn probability(&self, features: &[f64]) -> Result<f64, ModelError> {
        Ok(sigmoid(self.decision_function(features)?))
    }
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> &'static str {
        "logistic_regression"
    }

    fn predict(&self, features: &FeatureVector) -> Result<Verdict, ModelError> {
        let score = self.decision_function(features.as_slice())?;
        if !score.is_finite() {
            return Err(ModelError::NonFiniteScore);
        }
        verdict_for(sigmoid(score), self.threshold)
    }
}

fn sigmoid(value: f64) -> f64 {
    1.0 / (1.0 + (-value).exp())
}
