//! AWS Lambda handler for the tax and loan calculators
//!
//! Accepts a JSON event tagged with `calculator` and returns the calculation
//! result. Problems with the request are reported in the `error` field of the
//! response instead of failing the invocation.

use std::sync::OnceLock;

use chrono::{Local, NaiveDate};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

use sa_calculators::loan::{calculate_loan_with, LoanConfig, LoanResult};
use sa_calculators::profile::{LoanProfile, TaxProfile};
use sa_calculators::rates::{RateTables, TaxYear};
use sa_calculators::tax::{TaxConfig, TaxEngine, TaxResult};

/// Input for one calculation
#[derive(Debug, Deserialize)]
#[serde(tag = "calculator", rename_all = "snake_case")]
pub enum CalculationRequest {
    Tax(TaxRequest),
    Loan(LoanRequest),
}

#[derive(Debug, Deserialize)]
pub struct TaxRequest {
    #[serde(flatten)]
    pub profile: TaxProfile,

    /// Year of assessment (default: the year containing `as_at`)
    #[serde(default)]
    pub year: Option<TaxYear>,

    /// Date ages are measured at (default: today)
    #[serde(default)]
    pub as_at: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct LoanRequest {
    #[serde(flatten)]
    pub profile: LoanProfile,

    /// Include the period-by-period schedule (default: true)
    #[serde(default = "default_true")]
    pub include_schedule: bool,
}

fn default_true() -> bool {
    true
}

/// Output from the calculation
#[derive(Debug, Default, Serialize)]
pub struct CalculationResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<TaxResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan: Option<LoanResult>,
    pub execution_time_us: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CalculationResponse {
    fn error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }
}

/// Rate tables shared by every invocation of a warm container
static TABLES: OnceLock<Result<RateTables, String>> = OnceLock::new();

fn tables() -> Result<&'static RateTables, String> {
    TABLES
        .get_or_init(|| RateTables::from_env_or_builtin(None).map_err(|e| e.to_string()))
        .as_ref()
        .map_err(Clone::clone)
}

fn calculate(request: CalculationRequest) -> CalculationResponse {
    match request {
        CalculationRequest::Tax(TaxRequest {
            profile,
            year,
            as_at,
        }) => {
            let tables = match tables() {
                Ok(t) => t,
                Err(e) => return CalculationResponse::error(format!("Failed to load rate tables: {}", e)),
            };

            let as_at = as_at.unwrap_or_else(|| Local::now().date_naive());
            let table = match year {
                Some(year) => tables.require(year).map_err(|e| e.to_string()),
                None => tables
                    .nearest(TaxYear::containing(as_at))
                    .ok_or_else(|| "no rate tables loaded".to_string()),
            };

            match table {
                Ok(table) => CalculationResponse {
                    tax: Some(TaxEngine::new(table, TaxConfig::as_at(as_at)).calculate(&profile)),
                    ..Default::default()
                },
                Err(e) => CalculationResponse::error(e),
            }
        }
        CalculationRequest::Loan(LoanRequest {
            profile,
            include_schedule,
        }) => {
            let config = LoanConfig {
                detailed_output: include_schedule,
            };
            CalculationResponse {
                loan: Some(calculate_loan_with(&profile, &config)),
                ..Default::default()
            }
        }
    }
}

/// Lambda handler function
async fn handler(event: LambdaEvent<serde_json::Value>) -> Result<CalculationResponse, Error> {
    let start = std::time::Instant::now();

    let mut response = match serde_json::from_value::<CalculationRequest>(event.payload) {
        Ok(request) => calculate(request),
        Err(e) => CalculationResponse::error(format!("Invalid request: {}", e)),
    };

    if let Some(error) = &response.error {
        log::warn!("request {} failed: {}", event.context.request_id, error);
    }

    response.execution_time_us = start.elapsed().as_micros() as u64;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
