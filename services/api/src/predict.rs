use crate::cli::ModelArgs;
use crate::infra::build_prediction_service;
use clap::Args;
use loan_approval::config::AppConfig;
use loan_approval::error::AppError;
use loan_approval::scoring::{schema, FeatureVector, LoanDecision, LoanPredictionService};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// JSON file holding one applicant record
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Include the reconstructed feature vector in the output
    #[arg(long)]
    pub(crate) show_features: bool,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

#[derive(Debug, Serialize)]
struct PredictionReport {
    #[serde(flatten)]
    decision: LoanDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    features: Option<FeatureVector>,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let PredictArgs {
        input,
        show_features,
        model,
    } = args;

    let mut config = AppConfig::load()?;
    model.apply(&mut config.model);
    let service = build_prediction_service(&config.model)?;

    let reader = BufReader::new(File::open(input)?);
    let payload: serde_json::Value = serde_json::from_reader(reader)?;
    let report = score(&service, payload, show_features)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn score(
    service: &LoanPredictionService,
    payload: serde_json::Value,
    show_features: bool,
) -> Result<PredictionReport, AppError> {
    let features = if show_features {
        Some(service.reconstructor().reconstruct_value(payload.clone())?)
    } else {
        None
    };
    let decision = service.predict_value(payload)?;
    Ok(PredictionReport { decision, features })
}

pub(crate) fn run_schema() -> Result<(), AppError> {
    println!("Feature schema ({} columns)", schema::FEATURE_COUNT);
    for (index, column) in schema::feature_names().enumerate() {
        println!("{index:>3}  {column}");
    }
    Ok(())
}
