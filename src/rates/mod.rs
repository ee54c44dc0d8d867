//! Year-versioned income tax rate tables

mod table;
mod year;
pub mod loader;

pub use table::{Bracket, MedicalCredits, RateTable, Rebates, RetirementCap, TableError};
pub use year::{ParseTaxYearError, TaxYear};
pub use loader::RatesError;

use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable naming a rates directory to load instead of the built-in tables
pub const RATES_PATH_ENV: &str = "SA_CALC_RATES_PATH";

/// Immutable set of rate tables keyed by year of assessment
///
/// Built once at start-up and passed by reference into calculations.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTables {
    tables: BTreeMap<TaxYear, RateTable>,
}

impl RateTables {
    /// Published SARS tables compiled into the crate
    pub fn builtin() -> Self {
        Self::from_tables([
            RateTable::sars_2023(),
            RateTable::sars_2024(),
            RateTable::sars_2025(),
            RateTable::sars_2026(),
        ])
    }

    /// Build from individual tables; a later table for the same year wins
    pub fn from_tables(tables: impl IntoIterator<Item = RateTable>) -> Self {
        Self {
            tables: tables.into_iter().map(|t| (t.year, t)).collect(),
        }
    }

    /// Load tables from CSV files in the default location (data/rates/)
    pub fn from_csv() -> Result<Self, RatesError> {
        Self::from_csv_path(Path::new(loader::DEFAULT_RATES_PATH))
    }

    /// Load tables from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, RatesError> {
        Ok(Self {
            tables: loader::load_rate_tables(path)?,
        })
    }

    /// Load from `dir` when given, else from `SA_CALC_RATES_PATH`, else the built-in tables
    pub fn from_env_or_builtin(dir: Option<&Path>) -> Result<Self, RatesError> {
        if let Some(dir) = dir {
            return Self::from_csv_path(dir);
        }
        match std::env::var_os(RATES_PATH_ENV) {
            Some(dir) => Self::from_csv_path(Path::new(&dir)),
            None => Ok(Self::builtin()),
        }
    }

    /// Table for a year, if present
    pub fn get(&self, year: TaxYear) -> Option<&RateTable> {
        self.tables.get(&year)
    }

    /// Table for a year, or an error naming the missing year
    pub fn require(&self, year: TaxYear) -> Result<&RateTable, RatesError> {
        self.get(year).ok_or(RatesError::YearNotAvailable(year))
    }

    /// Table for the requested year, falling back to the most recent table
    /// not after it, then to the latest table overall
    pub fn nearest(&self, year: TaxYear) -> Option<&RateTable> {
        self.tables
            .range(..=year)
            .next_back()
            .map(|(_, t)| t)
            .or_else(|| self.latest())
    }

    /// Most recent table
    pub fn latest(&self) -> Option<&RateTable> {
        self.tables.values().next_back()
    }

    /// Available years in ascending order
    pub fn years(&self) -> impl Iterator<Item = TaxYear> + '_ {
        self.tables.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl Default for RateTables {
    fn default() -> Self {
        Self::builtin()
    }
}
