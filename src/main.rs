//! SA Calculators CLI
//!
//! Command-line interface for income tax, monthly PAYE and loan calculations

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use sa_calculators::loan::{calculate_loan, LoanResult};
use sa_calculators::profile::{format_percent, format_rand, parse_amount, LoanCategory, LoanProfile, TaxProfile};
use sa_calculators::rates::{RateTable, RateTables, TaxYear};
use sa_calculators::tax::{days_in_month, estimate_monthly_paye, TaxEngine, TaxConfig, TaxResult};

#[derive(Parser, Debug)]
#[command(name = "sa-calc")]
#[command(about = "South African income tax, PAYE and loan calculators")]
struct Cli {
    /// Directory holding tax_years.csv and brackets.csv (default: built-in SARS tables,
    /// or SA_CALC_RATES_PATH when set)
    #[arg(long, global = true)]
    rates: Option<PathBuf>,

    /// Print the full result as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Annual income tax for a year of assessment
    Tax(TaxArgs),
    /// PAYE to withhold for one (possibly partial) month
    Paye {
        #[command(flatten)]
        tax: TaxArgs,

        /// Days worked in the month (default: the whole month)
        #[arg(long)]
        days_worked: Option<u32>,

        /// Days in the month (default: length of the as-at month)
        #[arg(long)]
        days_in_month: Option<u32>,
    },
    /// Loan instalment and amortization
    Loan(LoanArgs),
    /// List the available years of assessment
    Years,
}

#[derive(Args, Debug)]
struct TaxArgs {
    /// Annual base income, e.g. "R 350 000"
    #[arg(value_parser = amount)]
    income: f64,

    /// Year of assessment, e.g. 2025 or 2024/25 (default: the year containing the as-at date)
    #[arg(long)]
    year: Option<TaxYear>,

    /// Date ages are measured at (default: today)
    #[arg(long)]
    as_at: Option<NaiveDate>,

    /// 13-digit identity number used to derive age
    #[arg(long)]
    id: Option<String>,

    /// Age, overriding the identity number
    #[arg(long)]
    age: Option<u32>,

    /// People covered by the medical scheme, main member included
    #[arg(long, default_value_t = 0)]
    dependents: u32,

    /// Monthly medical scheme premium
    #[arg(long, value_parser = amount, default_value = "0")]
    medical_premium: f64,

    /// Months of the year the scheme was paid for
    #[arg(long, default_value_t = 12)]
    medical_months: u32,

    /// Qualifying medical expenses not covered by the scheme
    #[arg(long, value_parser = amount, default_value = "0")]
    out_of_pocket: f64,

    /// Taxpayer or a dependant has a disability
    #[arg(long)]
    disabled: bool,

    /// Annual retirement fund contributions
    #[arg(long, value_parser = amount, default_value = "0")]
    retirement: f64,

    /// Annual travel allowance
    #[arg(long, value_parser = amount, default_value = "0")]
    travel: f64,

    /// At least 80% of travel is for business
    #[arg(long)]
    mostly_business: bool,
}

impl TaxArgs {
    fn profile(&self) -> TaxProfile {
        TaxProfile {
            annual_income: self.income,
            id_number: self.id.clone(),
            age: self.age,
            medical_dependents: self.dependents,
            medical_premium_monthly: self.medical_premium,
            medical_months: self.medical_months,
            out_of_pocket_medical: self.out_of_pocket,
            disabled: self.disabled,
            retirement_contribution: self.retirement,
            travel_allowance: self.travel,
            travel_mostly_business: self.mostly_business,
        }
    }

    fn as_at(&self) -> NaiveDate {
        self.as_at.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CategoryArg {
    Standard,
    Balloon,
    FeeBearing,
}

#[derive(Args, Debug)]
struct LoanArgs {
    /// Purchase price or loan amount
    #[arg(value_parser = amount)]
    amount: f64,

    /// Annual interest rate in percent, e.g. 11.75
    #[arg(long, value_parser = amount)]
    rate: f64,

    /// Term in months
    #[arg(long)]
    term: u32,

    #[arg(long, value_parser = amount, default_value = "0")]
    deposit: f64,

    /// Once-off fees financed into the loan
    #[arg(long, value_parser = amount, default_value = "0")]
    fees: f64,

    #[arg(long, value_enum, default_value = "standard")]
    category: CategoryArg,

    /// Residual percentage for balloon loans
    #[arg(long, value_parser = amount, default_value = "0")]
    residual_pct: f64,

    /// Initiation fee for fee-bearing loans
    #[arg(long, value_parser = amount, default_value = "0")]
    initiation_fee: f64,

    /// Monthly service fee for fee-bearing loans
    #[arg(long, value_parser = amount, default_value = "0")]
    service_fee: f64,

    /// Extra payment made every month
    #[arg(long, value_parser = amount, default_value = "0")]
    extra: f64,

    /// Write the amortization schedule to this CSV file
    #[arg(long)]
    schedule: Option<PathBuf>,
}

impl LoanArgs {
    fn profile(&self) -> LoanProfile {
        let category = match self.category {
            CategoryArg::Standard => LoanCategory::Standard,
            CategoryArg::Balloon => LoanCategory::Balloon {
                residual_pct: self.residual_pct,
            },
            CategoryArg::FeeBearing => LoanCategory::FeeBearing {
                initiation_fee: self.initiation_fee,
                monthly_service_fee: self.service_fee,
            },
        };

        LoanProfile {
            amount: self.amount,
            deposit: self.deposit,
            financed_fees: self.fees,
            annual_rate_pct: self.rate,
            term_months: self.term,
            category,
            extra_monthly_payment: self.extra,
        }
    }
}

fn amount(text: &str) -> Result<f64, String> {
    Ok(parse_amount(text))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let tables = RateTables::from_env_or_builtin(cli.rates.as_deref())
        .context("failed to load rate tables")?;

    match &cli.command {
        Command::Tax(args) => {
            let table = select_table(&tables, args)?;
            let engine = TaxEngine::new(table, TaxConfig::as_at(args.as_at()));
            let result = engine.calculate(&args.profile());
            if cli.json {
                print_json(&result)?;
            } else {
                print_tax(&result);
            }
        }
        Command::Paye {
            tax,
            days_worked,
            days_in_month: month_days,
        } => {
            let table = select_table(&tables, tax)?;
            let as_at = tax.as_at();
            let month_days = month_days.unwrap_or_else(|| days_in_month(as_at.year(), as_at.month()));
            let days_worked = days_worked.unwrap_or(month_days);

            let paye = estimate_monthly_paye(&tax.profile(), table, as_at, days_worked, month_days);
            if cli.json {
                print_json(&paye)?;
            } else {
                println!("Days worked:      {} of {} ({})", days_worked, month_days, format_percent(paye.fraction));
                print_tax(&paye.result);
                println!("PAYE this month:  {}", format_rand(paye.paye));
            }
        }
        Command::Loan(args) => {
            let result = calculate_loan(&args.profile());

            if let Some(path) = &args.schedule {
                let file = File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                result.write_schedule_csv(BufWriter::new(file))?;
                log::info!("schedule written to {}", path.display());
            }

            if cli.json {
                print_json(&result)?;
            } else {
                print_loan(&result);
            }
        }
        Command::Years => {
            if cli.json {
                let years: Vec<_> = tables.years().collect();
                print_json(&years)?;
            } else {
                print_years(&tables);
            }
        }
    }

    Ok(())
}

fn select_table<'a>(tables: &'a RateTables, args: &TaxArgs) -> Result<&'a RateTable> {
    let year = args.year.unwrap_or_else(|| TaxYear::containing(args.as_at()));

    // An explicit year must exist; the default year may fall back to the nearest table
    if args.year.is_some() {
        return Ok(tables.require(year)?);
    }
    match tables.nearest(year) {
        Some(table) => Ok(table),
        None => bail!("no rate tables loaded"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_tax(result: &TaxResult) {
    println!("Year of assessment {} (age {})", result.tax_year, result.age);
    println!("{}", "-".repeat(44));
    let rows = [
        ("Taxable travel", result.taxable_travel),
        ("Retirement deduction", result.retirement_deduction),
        ("Taxable income", result.taxable_income),
        ("Tax before rebates", result.tax_before_rebates),
        ("Rebates", result.rebates.total),
        ("Tax after rebates", result.tax_after_rebates),
        ("Medical tax credit", result.medical_credit_annual),
        ("Additional medical credit", result.additional_medical_credit),
        ("Annual tax", result.annual_tax),
        ("Monthly tax", result.monthly_tax),
        ("Income after tax", result.annual_after_tax()),
    ];
    for (label, value) in rows {
        println!("{:<26} {:>17}", label, format_rand(value));
    }
    println!("{:<26} {:>17}", "Effective rate", format_percent(result.effective_rate));
}

fn print_loan(result: &LoanResult) {
    println!("{} loan over {} months", result.category.as_str(), result.months);
    println!("{}", "-".repeat(44));
    println!("{:<26} {:>17}", "Principal", format_rand(result.principal));
    println!("{:<26} {:>17}", "Instalment", format_rand(result.instalment));
    println!("{:<26} {:>17}", "Monthly payment", format_rand(result.monthly_payment));
    println!("{:<26} {:>17}", "Total interest", format_rand(result.total_interest));
    println!("{:<26} {:>17}", "Total fees", format_rand(result.total_fees));
    println!("{:<26} {:>17}", "Total paid", format_rand(result.total_paid));
    println!("{:<26} {:>17}", "Cost of credit", format_rand(result.cost_of_credit()));
    if result.category.has_balloon() {
        println!("{:<26} {:>17}", "Balloon payment", format_rand(result.final_balance));
    }

    if !result.schedule.is_empty() {
        println!();
        println!("{:>6} {:>14} {:>14} {:>14} {:>16}", "Month", "Payment", "Interest", "Principal", "Balance");
        for row in result.schedule.iter().take(12) {
            println!(
                "{:>6} {:>14.2} {:>14.2} {:>14.2} {:>16.2}",
                row.period, row.payment, row.interest, row.principal, row.balance
            );
        }
        if result.schedule.len() > 12 {
            println!("   ... {} more months", result.schedule.len() - 12);
        }
    }
}

fn print_years(tables: &RateTables) {
    println!("{:<9} {:>12} {:>12} {:>12} {:>10}", "Year", "Primary", "Secondary", "Tertiary", "Top rate");
    for year in tables.years() {
        if let Some(table) = tables.get(year) {
            let top = table.brackets.last().map(|b| b.rate).unwrap_or(0.0);
            println!(
                "{:<9} {:>12.0} {:>12.0} {:>12.0} {:>10}",
                year.to_string(),
                table.rebates.primary,
                table.rebates.secondary,
                table.rebates.tertiary,
                format_percent(top)
            );
        }
    }
}
