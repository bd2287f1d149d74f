use crate::predict::{run_predict, run_schema, PredictArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use loan_approval::error::AppError;
use loan_approval::scoring::UnknownCategoryPolicy;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Approval Service",
    about = "Serve and exercise the loan approval classifier from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a single applicant record read from a JSON file
    Predict(PredictArgs),
    /// Print the classifier's feature columns in order
    Schema,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) model: ModelArgs,
}

/// Overrides shared by every command that loads the classifier.
#[derive(Args, Debug, Default)]
pub(crate) struct ModelArgs {
    /// Path to the classifier artifact (defaults to APP_MODEL_PATH)
    #[arg(long = "model")]
    pub(crate) model_path: Option<PathBuf>,
    /// Handling of unknown categorical values: reject or zero-fill
    #[arg(long, value_parser = crate::infra::parse_policy)]
    pub(crate) unknown_category: Option<UnknownCategoryPolicy>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Predict(args) => run_predict(args),
        Command::Schema => run_schema(),
    }
}
