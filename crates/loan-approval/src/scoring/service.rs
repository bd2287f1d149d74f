use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::applicant::ApplicantRecord;
use super::features::{FeatureReconstructor, FeatureVector, ReconstructionError};
use super::model::{Classifier, ModelError, Verdict};

/// Response body returned for a scored application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanDecision {
    pub loan_approval: Verdict,
}

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("error in preprocessing input: {0}")]
    Reconstruction(#[from] ReconstructionError),
    #[error("error in model prediction: {0}")]
    Model(#[from] ModelError),
}

/// Service composing the feature reconstructor with a classifier loaded at startup.
pub struct LoanPredictionService {
    classifier: Arc<dyn Classifier>,
    reconstructor: FeatureReconstructor,
}

impl LoanPredictionService {
    pub fn new(classifier: Arc<dyn Classifier>, reconstructor: FeatureReconstructor) -> Self {
        Self {
            classifier,
            reconstructor,
        }
    }

    pub fn classifier_kind(&self) -> &'static str {
        self.classifier.kind()
    }

    pub fn reconstructor(&self) -> &FeatureReconstructor {
        &self.reconstructor
    }

    pub fn features(&self, record: &ApplicantRecord) -> Result<FeatureVector, PredictionError> {
        Ok(self.reconstructor.reconstruct(record)?)
    }

    pub fn predict(&self, record: &ApplicantRecord) -> Result<LoanDecision, PredictionError> {
        let features = self.features(record)?;
        self.decide(&features)
    }

    /// Scores an untyped payload; shape errors surface as reconstruction failures.
    pub fn predict_value(
        &self,
        payload: serde_json::Value,
    ) -> Result<LoanDecision, PredictionError> {
        let features = self.reconstructor.reconstruct_value(payload)?;
        self.decide(&features)
    }

    fn decide(&self, features: &FeatureVector) -> Result<LoanDecision, PredictionError> {
        let verdict = self.classifier.predict(features)?;
        debug!(
            model = self.classifier.kind(),
            verdict = verdict.label(),
            "loan application scored"
        );
        Ok(LoanDecision {
            loan_approval: verdict,
        })
    }
}
