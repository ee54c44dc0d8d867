//! Scenario runner for repeated and batch calculations
//!
//! Holds the rate tables once, then runs many tax calculations against them
//! without reloading CSV files.

use chrono::{Local, NaiveDate};
use rayon::prelude::*;

use crate::profile::{ProfileRecord, TaxProfile};
use crate::rates::{RateTable, RateTables, RatesError, TaxYear};
use crate::tax::{TaxConfig, TaxEngine, TaxResult};

/// Pre-loaded scenario runner for tax calculations
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
///
/// for income in [250_000.0, 500_000.0, 1_000_000.0] {
///     let result = runner.run(TaxYear(2025), &TaxProfile::new(income))?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    tables: RateTables,
    as_at: Option<NaiveDate>,
}

impl ScenarioRunner {
    /// Create runner with the built-in rate tables
    pub fn new() -> Self {
        Self::with_tables(RateTables::builtin())
    }

    /// Create runner by loading rate tables from CSV files
    pub fn from_csv() -> Result<Self, RatesError> {
        Ok(Self::with_tables(RateTables::from_csv()?))
    }

    /// Create runner from a specific rates directory
    pub fn from_csv_path(path: &std::path::Path) -> Result<Self, RatesError> {
        Ok(Self::with_tables(RateTables::from_csv_path(path)?))
    }

    /// Create runner with pre-built tables
    pub fn with_tables(tables: RateTables) -> Self {
        Self { tables, as_at: None }
    }

    /// Measure ages at a fixed date instead of today
    pub fn as_at(mut self, date: NaiveDate) -> Self {
        self.as_at = Some(date);
        self
    }

    fn config(&self) -> TaxConfig {
        match self.as_at {
            Some(date) => TaxConfig::as_at(date),
            None => TaxConfig::as_at(Local::now().date_naive()),
        }
    }

    /// Year containing the valuation date
    pub fn current_year(&self) -> TaxYear {
        TaxYear::containing(self.config().as_at)
    }

    /// Table for the year, falling back to the nearest earlier (or latest) table
    pub fn table_for(&self, year: TaxYear) -> Result<&RateTable, RatesError> {
        self.tables.nearest(year).ok_or(RatesError::YearNotAvailable(year))
    }

    /// Run a single tax calculation
    pub fn run(&self, year: TaxYear, profile: &TaxProfile) -> Result<TaxResult, RatesError> {
        let table = self.table_for(year)?;
        if table.year != year {
            log::warn!("no rate table for {}, using {}", year, table.year);
        }
        Ok(TaxEngine::new(table, self.config()).calculate(profile))
    }

    /// Run the same year for many profiles in parallel, preserving order
    pub fn run_batch(
        &self,
        year: TaxYear,
        profiles: &[ProfileRecord],
    ) -> Result<Vec<(String, TaxResult)>, RatesError> {
        let table = self.table_for(year)?;
        let engine = TaxEngine::new(table, self.config());

        Ok(profiles
            .par_iter()
            .map(|record| (record.label.clone(), engine.calculate(&record.profile)))
            .collect())
    }

    /// Run one profile against several years
    pub fn run_years(
        &self,
        profile: &TaxProfile,
        years: &[TaxYear],
    ) -> Result<Vec<TaxResult>, RatesError> {
        years.iter().map(|&year| self.run(year, profile)).collect()
    }

    /// Get reference to the rate tables
    pub fn tables(&self) -> &RateTables {
        &self.tables
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> ScenarioRunner {
        ScenarioRunner::new().as_at(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap())
    }

    #[test]
    fn test_current_year() {
        assert_eq!(runner().current_year(), TaxYear(2025));
    }

    #[test]
    fn test_run_batch_preserves_order() {
        let records: Vec<_> = [120_000.0, 350_000.0, 900_000.0]
            .iter()
            .enumerate()
            .map(|(i, &income)| ProfileRecord {
                label: format!("p{}", i),
                profile: TaxProfile::new(income),
            })
            .collect();

        let results = runner().run_batch(TaxYear(2025), &records).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].0, "p1");
        assert!((results[1].1.annual_tax - 54_797.0).abs() < 1e-6);

        // Higher income should pay more tax
        assert!(results[2].1.annual_tax > results[1].1.annual_tax);
        assert!(results[1].1.annual_tax > results[0].1.annual_tax);
    }

    #[test]
    fn test_run_years_uses_each_table() {
        let profile = TaxProfile::new(350_000.0);
        let results = runner()
            .run_years(&profile, &[TaxYear(2023), TaxYear(2025)])
            .unwrap();
        assert_eq!(results[0].tax_year, TaxYear(2023));
        // Bracket creep relief: the same income pays less in the later year
        assert!(results[1].annual_tax < results[0].annual_tax);
    }

    #[test]
    fn test_missing_year_falls_back() {
        let result = runner().run(TaxYear(2031), &TaxProfile::new(350_000.0)).unwrap();
        assert_eq!(result.tax_year, TaxYear(2026));
    }

    #[test]
    fn test_empty_tables_error() {
        let runner = ScenarioRunner::with_tables(RateTables::from_tables(Vec::new()));
        assert!(matches!(
            runner.run(TaxYear(2025), &TaxProfile::new(1.0)),
            Err(RatesError::YearNotAvailable(TaxYear(2025)))
        ));
    }
}
