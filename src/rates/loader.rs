//! CSV-based rate table loader
//!
//! Loads rate tables from `tax_years.csv` and `brackets.csv` in data/rates/

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::table::{Bracket, MedicalCredits, RateTable, Rebates, RetirementCap, TableError};
use super::year::TaxYear;

/// Default path to the rates directory
pub const DEFAULT_RATES_PATH: &str = "data/rates";

/// Errors raised while loading rate tables
#[derive(Debug, thiserror::Error)]
pub enum RatesError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed rate CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("brackets given for {0} but it has no row in tax_years.csv")]
    UnknownYear(TaxYear),
    #[error("tax year {0} has no brackets")]
    MissingBrackets(TaxYear),
    #[error("invalid rate table for {year}: {source}")]
    InvalidTable {
        year: TaxYear,
        #[source]
        source: TableError,
    },
    #[error("no rate table for tax year {0}")]
    YearNotAvailable(TaxYear),
}

/// Raw row of tax_years.csv
#[derive(Debug, Deserialize)]
struct YearRow {
    year: TaxYear,
    primary_rebate: f64,
    secondary_rebate: f64,
    tertiary_rebate: f64,
    mtc_first_two: f64,
    mtc_additional: f64,
    retirement_cap_pct: f64,
    retirement_cap_amount: f64,
}

/// Raw row of brackets.csv; an empty `upper` marks the top bracket
#[derive(Debug, Deserialize)]
struct BracketRow {
    year: TaxYear,
    upper: Option<f64>,
    base: f64,
    rate: f64,
}

fn open(path: &Path) -> Result<File, RatesError> {
    File::open(path).map_err(|source| RatesError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load rate tables from the two CSV files in `dir`
pub fn load_rate_tables(dir: &Path) -> Result<BTreeMap<TaxYear, RateTable>, RatesError> {
    let years = open(&dir.join("tax_years.csv"))?;
    let brackets = open(&dir.join("brackets.csv"))?;
    load_rate_tables_from_readers(years, brackets)
}

/// Load rate tables from any pair of readers (e.g. in-memory buffers)
pub fn load_rate_tables_from_readers<Y: Read, B: Read>(
    years: Y,
    brackets: B,
) -> Result<BTreeMap<TaxYear, RateTable>, RatesError> {
    let mut tables = BTreeMap::new();

    for result in csv::Reader::from_reader(years).deserialize() {
        let row: YearRow = result?;
        tables.insert(
            row.year,
            RateTable {
                year: row.year,
                brackets: Vec::new(),
                rebates: Rebates {
                    primary: row.primary_rebate,
                    secondary: row.secondary_rebate,
                    tertiary: row.tertiary_rebate,
                },
                medical_credits: MedicalCredits {
                    first_two: row.mtc_first_two,
                    additional: row.mtc_additional,
                },
                retirement_cap: RetirementCap {
                    percentage: row.retirement_cap_pct,
                    ceiling: row.retirement_cap_amount,
                },
            },
        );
    }

    let mut bands: BTreeMap<TaxYear, Vec<(Option<f64>, f64, f64)>> = BTreeMap::new();
    for result in csv::Reader::from_reader(brackets).deserialize() {
        let row: BracketRow = result?;
        if !tables.contains_key(&row.year) {
            return Err(RatesError::UnknownYear(row.year));
        }
        bands.entry(row.year).or_default().push((row.upper, row.base, row.rate));
    }

    for (year, table) in tables.iter_mut() {
        let mut year_bands = bands.remove(year).ok_or(RatesError::MissingBrackets(*year))?;
        // Ascending by upper bound, open-ended bracket last
        year_bands.sort_by(|a, b| {
            let a = a.0.unwrap_or(f64::INFINITY);
            let b = b.0.unwrap_or(f64::INFINITY);
            a.total_cmp(&b)
        });
        table.brackets = RateTable::brackets_from_bands(&year_bands);

        table.validate().map_err(|source| RatesError::InvalidTable {
            year: *year,
            source,
        })?;

        for index in table.inconsistent_bases() {
            let Bracket { base, lower, .. } = table.brackets[index];
            log::warn!(
                "{}: bracket {} base {:.2} does not match tax at {:.2}",
                year,
                index,
                base,
                lower
            );
        }
    }

    log::debug!("loaded {} rate tables", tables.len());
    Ok(tables)
}
