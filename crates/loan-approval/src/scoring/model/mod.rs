//! Trained classifier artifacts and the prediction seam they implement.
//!
//! Artifacts are JSON documents carrying the column list the model was fitted on
//! and the fitted parameters. The column list must equal the feature schema
//! exactly; a mismatch is a load failure rather than a silent misread at request
//! time.

mod forest;
mod linear;

pub use forest::{DecisionTree, TreeEnsemble, TreeNode};
pub use linear::{LogisticRegression, StandardScaler};

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::features::FeatureVector;
use super::schema::{self, FEATURE_COUNT};

/// Binary outcome produced by a classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Approved,
    Rejected,
}

impl Verdict {
    /// Positive class (1) approves, anything else rejects.
    pub const fn from_class(class: u8) -> Self {
        match class {
            1 => Self::Approved,
            _ => Self::Rejected,
        }
    }

    pub const fn class(self) -> u8 {
        match self {
            Self::Approved => 1,
            Self::Rejected => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// Read-only model shared across requests.
pub trait Classifier: Send + Sync {
    fn kind(&self) -> &'static str;
    fn predict(&self, features: &FeatureVector) -> Result<Verdict, ModelError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unable to read model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("model artifact is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model was trained on {found} features, expected {expected}")]
    FeatureCount { expected: usize, found: usize },
    #[error("model feature {index} is '{found}', expected '{expected}'")]
    FeatureOrder {
        index: usize,
        expected: &'static str,
        found: String,
    },
    #[error("invalid model parameters: {0}")]
    Invalid(String),
    #[error("model produced a non-finite score")]
    NonFiniteScore,
}

/// Fitted parameters, tagged by estimator family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelParams {
    LogisticRegression(LogisticRegression),
    TreeEnsemble(TreeEnsemble),
}

/// Serialized classifier as written by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub model: ModelParams,
}

impl ModelArtifact {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ModelError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Checks the column list against the schema, then the parameters against
    /// the column count.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.feature_names.len() != FEATURE_COUNT {
            return Err(ModelError::FeatureCount {
                expected: FEATURE_COUNT,
                found: self.feature_names.len(),
            });
        }

        for (index, (expected, found)) in schema::feature_names()
            .zip(&self.feature_names)
            .enumerate()
        {
            if expected != found {
                return Err(ModelError::FeatureOrder {
                    index,
                    expected,
                    found: found.clone(),
                });
            }
        }

        match &self.model {
            ModelParams::LogisticRegression(model) => model.validate(FEATURE_COUNT),
            ModelParams::TreeEnsemble(model) => model.validate(FEATURE_COUNT),
        }
    }

    pub fn into_classifier(self) -> Result<Arc<dyn Classifier>, ModelError> {
        self.validate()?;
        let classifier: Arc<dyn Classifier> = match self.model {
            ModelParams::LogisticRegression(model) => Arc::new(model),
            ModelParams::TreeEnsemble(model) => Arc::new(model),
        };
        Ok(classifier)
    }
}

/// Loads and validates an artifact from disk.
pub fn load_classifier(path: impl AsRef<Path>) -> Result<Arc<dyn Classifier>, ModelError> {
    ModelArtifact::from_path(path)?.into_classifier()
}

pub(crate) fn default_threshold() -> f64 {
    0.5
}

pub(crate) fn check_threshold(threshold: f64) -> Result<(), ModelError> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(ModelError::Invalid(format!(
            "decision threshold {threshold} must lie within [0, 1]"
        )))
    }
}

pub(crate) fn verdict_for(probability: f64, threshold: f64) -> Result<Verdict, ModelError> {
    if !probability.is_finite() {
        return Err(ModelError::NonFiniteScore);
    }
    let class = u8::from(probability >= threshold);
    Ok(Verdict::from_class(class))
}
