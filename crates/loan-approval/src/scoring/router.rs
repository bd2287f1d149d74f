use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::warn;

use super::schema;
use super::service::{LoanPredictionService, PredictionError};

/// Router builder exposing the prediction and schema endpoints.
pub fn prediction_router(service: Arc<LoanPredictionService>) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/api/v1/schema", get(schema_handler))
        .with_state(service)
}

pub(crate) async fn predict_handler(
    State(service): State<Arc<LoanPredictionService>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            let message = rejection.body_text();
            warn!(error = %message, "unreadable loan application body");
            let payload = json!({ "error": message });
            return (rejection.status(), Json(payload)).into_response();
        }
    };

    match service.predict_value(payload) {
        Ok(decision) => (StatusCode::OK, Json(decision)).into_response(),
        Err(error @ PredictionError::Reconstruction(_)) => {
            warn!(%error, "rejected loan application");
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn schema_handler() -> Json<Value> {
    let features: Vec<&str> = schema::feature_names().collect();
    Json(json!({ "features": features }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::features::{FeatureReconstructor, FeatureVector, UnknownCategoryPolicy};
    use crate::scoring::model::{Classifier, ModelError, Verdict};
    use crate::scoring::schema::FEATURE_COUNT;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use tower::ServiceExt;

    /// Approves when the applicant has no prior default.
    struct PriorDefaultClassifier;

    impl Classifier for PriorDefaultClassifier {
        fn kind(&self) -> &'static str {
            "prior_default"
        }

        fn predict(&self, features: &FeatureVector) -> Result<Verdict, ModelError> {
            let clean = features.get("Default_0").unwrap_or_default();
            Ok(Verdict::from_class(clean as u8))
        }
    }

    fn router() -> Router {
        let reconstructor =
            FeatureReconstructor::new(UnknownCategoryPolicy::Reject).expect("schema valid");
        let service = LoanPredictionService::new(Arc::new(PriorDefaultClassifier), reconstructor);
        prediction_router(Arc::new(service))
    }

    fn application(prior_default: &str) -> Value {
        json!({
            "Age": 52,
            "Income": 98000,
            "LoanAmount": 25000,
            "CreditScore": 760,
            "MonthsEmployed": 120,
            "NumCreditLines": 4,
            "InterestRate": 5.1,
            "LoanTerm": 60,
            "Education": "PhD",
            "EmploymentType": "Self-employed",
            "MaritalStatus": "Married",
            "HasMortgage": "Yes",
            "HasDependents": "Yes",
            "LoanPurpose": "Business",
            "HasCoSigner": "No",
            "Default": prior_default
        })
    }

    async fn post_json(router: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
        let response = router
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(body).unwrap()))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn predict_route_returns_verdict_label() {
        let (status, body) = post_json(router(), "/predict", &application("No")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "loan_approval": "Approved" }));

        let (status, body) = post_json(router(), "/predict", &application("Yes")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "loan_approval": "Rejected" }));
    }

    #[tokio::test]
    async fn predict_route_reports_unknown_category() {
        let mut body = application("No");
        body["Education"] = json!("Doctorate");

        let (status, payload) = post_json(router(), "/predict", &body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default();
        assert!(message.contains("Doctorate"));
    }

    #[tokio::test]
    async fn predict_route_reports_missing_fields() {
        let mut body = application("No");
        body.as_object_mut().expect("object").remove("CreditScore");

        let (status, payload) = post_json(router(), "/predict", &body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .contains("CreditScore"));
    }

    async fn post_raw(content_type: &str, body: &'static str) -> (StatusCode, Value) {
        let response = router()
            .oneshot(
                Request::post("/predict")
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn predict_route_reports_unparseable_body_as_json() {
        let (status, payload) = post_raw("application/json", "{not json").await;
        assert!(status.is_client_error());
        assert!(!payload["error"].as_str().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn predict_route_reports_wrong_content_type_as_json() {
        let (status, payload) = post_raw("text/plain", r#"{"Age": 35}"#).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(payload["error"]
            .as_str()
            .unwrap_or_default()
            .contains("Content-Type"));
    }

    #[tokio::test]
    async fn schema_route_lists_columns_in_order() {
        let response = router()
            .oneshot(Request::get("/api/v1/schema").body(Body::empty()).unwrap())
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        let payload: Value = serde_json::from_slice(&bytes).expect("json body");
        let features = payload["features"].as_array().expect("feature list");
        assert_eq!(features.len(), FEATURE_COUNT);
        assert_eq!(features[8], json!("DTIRatio"));
        assert_eq!(features[32], json!("Default_1"));
    }
}
