//! Loan application scoring: applicant records, the fixed feature schema, the
//! reconstruction that projects one onto the other, and the classifier seam.

pub mod applicant;
pub mod features;
pub mod model;
pub mod router;
pub mod schema;
pub mod service;

pub use applicant::ApplicantRecord;
pub use features::{
    FeatureReconstructor, FeatureVector, ReconstructionError, UnknownCategoryPolicy,
};
pub use model::{load_classifier, Classifier, ModelArtifact, ModelError, ModelParams, Verdict};
pub use router::prediction_router;
pub use schema::{CategoricalAttribute, NumericFeature, FEATURE_COUNT, FEATURE_SCHEMA};
pub use service::{LoanDecision, LoanPredictionService, PredictionError};
