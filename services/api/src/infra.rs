use crate::cli::ModelArgs;
use loan_approval::config::ModelConfig;
use loan_approval::error::AppError;
use loan_approval::scoring::{
    load_classifier, FeatureReconstructor, LoanPredictionService, UnknownCategoryPolicy,
    FEATURE_COUNT,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

impl ModelArgs {
    pub(crate) fn apply(self, config: &mut ModelConfig) {
        if let Some(path) = self.model_path {
            config.path = path;
        }
        if let Some(policy) = self.unknown_category {
            config.unknown_category = policy;
        }
    }
}

/// Loads the classifier artifact once and wires it to a reconstructor.
pub(crate) fn build_prediction_service(
    config: &ModelConfig,
) -> Result<Arc<LoanPredictionService>, AppError> {
    let classifier = load_classifier(&config.path)?;
    let reconstructor = FeatureReconstructor::new(config.unknown_category)?;

    info!(
        model = classifier.kind(),
        path = %config.path.display(),
        features = FEATURE_COUNT,
        unknown_category = config.unknown_category.label(),
        "classifier loaded"
    );

    Ok(Arc::new(LoanPredictionService::new(
        classifier,
        reconstructor,
    )))
}

pub(crate) fn parse_policy(raw: &str) -> Result<UnknownCategoryPolicy, String> {
    UnknownCategoryPolicy::parse(raw)
        .ok_or_else(|| format!("expected 'reject' or 'zero-fill', found '{raw}'"))
}
