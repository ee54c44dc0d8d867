//! Run the tax calculation for every profile in a CSV file
//!
//! Usage: batch_tax [PROFILES_CSV] [OUTPUT_CSV] [YEAR]
//!
//! Defaults to data/profiles_sample.csv, batch_tax_output.csv and the year
//! of assessment containing today.

use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;

use sa_calculators::profile::load_profiles;
use sa_calculators::rates::{RateTables, TaxYear};
use sa_calculators::ScenarioRunner;

/// One output row per input profile
#[derive(Debug, Serialize)]
struct OutputRow {
    label: String,
    tax_year: String,
    age: u32,
    taxable_income: f64,
    tax_before_rebates: f64,
    rebates: f64,
    medical_credits: f64,
    annual_tax: f64,
    monthly_tax: f64,
    effective_rate: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let input = args.first().map(String::as_str).unwrap_or("data/profiles_sample.csv");
    let output = args.get(1).map(String::as_str).unwrap_or("batch_tax_output.csv");

    let today = Local::now().date_naive();
    let year = match args.get(2) {
        Some(text) => text.parse::<TaxYear>()?,
        None => TaxYear::containing(today),
    };

    let start = Instant::now();
    println!("Loading profiles from {}...", input);
    let records = load_profiles(input).with_context(|| format!("failed to load {}", input))?;
    println!("Loaded {} profiles in {:?}", records.len(), start.elapsed());

    let tables = RateTables::from_env_or_builtin(None).context("failed to load rate tables")?;
    let runner = ScenarioRunner::with_tables(tables).as_at(today);

    let calc_start = Instant::now();
    let results = runner.run_batch(year, &records)?;
    println!("Calculated {} in {:?}", year, calc_start.elapsed());

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("failed to create {}", output))?;

    let mut total_tax = 0.0;
    for (label, result) in &results {
        total_tax += result.annual_tax;
        writer.serialize(OutputRow {
            label: label.clone(),
            tax_year: result.tax_year.to_string(),
            age: result.age,
            taxable_income: result.taxable_income,
            tax_before_rebates: result.tax_before_rebates,
            rebates: result.rebates.total,
            medical_credits: result.total_medical_credits(),
            annual_tax: result.annual_tax,
            monthly_tax: result.monthly_tax,
            effective_rate: result.effective_rate,
        })?;
    }
    writer.flush()?;

    println!("Output written to {}", output);
    println!("\nBatch Summary:");
    println!("  Profiles:   {}", results.len());
    println!("  Total tax:  R {:.2}", total_tax);
    if !results.is_empty() {
        println!("  Mean tax:   R {:.2}", total_tax / results.len() as f64);
    }
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
