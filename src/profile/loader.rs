//! Load batches of tax profiles from CSV
//!
//! Amount columns are free text and go through the same lenient parsing as
//! form input, so `"R 350 000"` and `"350000"` are equivalent.

use std::io::Read;
use std::path::{Path, PathBuf};

use csv::Reader;
use serde::Deserialize;

use super::amount::{parse_amount, parse_count, parse_flag};
use super::TaxProfile;

/// Errors raised while reading a profile batch
#[derive(Debug, thiserror::Error)]
pub enum ProfileLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed profile CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A tax profile tagged with the caller's row label
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileRecord {
    pub label: String,
    pub profile: TaxProfile,
}

/// Raw CSV row; every column except `label` is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    label: String,
    annual_income: String,
    id_number: String,
    age: String,
    medical_dependents: String,
    medical_premium_monthly: String,
    medical_months: String,
    out_of_pocket_medical: String,
    disabled: String,
    retirement_contribution: String,
    travel_allowance: String,
    travel_mostly_business: String,
}

impl CsvRow {
    fn into_record(self, row_number: usize) -> ProfileRecord {
        let label = if self.label.trim().is_empty() {
            format!("row {}", row_number)
        } else {
            self.label.trim().to_string()
        };

        let id_number = Some(self.id_number.trim().to_string()).filter(|s| !s.is_empty());
        let age = Some(self.age.trim())
            .filter(|s| !s.is_empty())
            .map(parse_count);

        ProfileRecord {
            label,
            profile: TaxProfile {
                annual_income: parse_amount(&self.annual_income),
                id_number,
                age,
                medical_dependents: parse_count(&self.medical_dependents),
                medical_premium_monthly: parse_amount(&self.medical_premium_monthly),
                medical_months: parse_count(&self.medical_months),
                out_of_pocket_medical: parse_amount(&self.out_of_pocket_medical),
                disabled: parse_flag(&self.disabled),
                retirement_contribution: parse_amount(&self.retirement_contribution),
                travel_allowance: parse_amount(&self.travel_allowance),
                travel_mostly_business: parse_flag(&self.travel_mostly_business),
            },
        }
    }
}

/// Load all profiles from a CSV file
pub fn load_profiles<P: AsRef<Path>>(path: P) -> Result<Vec<ProfileRecord>, ProfileLoadError> {
    let path = path.as_ref();
    let reader = Reader::from_path(path).map_err(|source| ProfileLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_records(reader)
}

/// Load profiles from any reader (e.g., string buffer, request body)
pub fn load_profiles_from_reader<R: Read>(reader: R) -> Result<Vec<ProfileRecord>, ProfileLoadError> {
    read_records(Reader::from_reader(reader))
}

fn read_records<R: Read>(mut reader: Reader<R>) -> Result<Vec<ProfileRecord>, ProfileLoadError> {
    let mut records = Vec::new();

    for (i, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        records.push(row.into_record(i + 1));
    }

    log::debug!("loaded {} tax profiles", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_lenient_rows() {
        let data = "\
label,annual_income,id_number,age,medical_dependents,medical_premium_monthly,medical_months,disabled,travel_allowance,travel_mostly_business
alice,\"R 350 000\",,,0,,,no,,
bob,\"480,000.00\",6001015009087,,3,\"4 500\",12,yes,60000,y
,120000,,67,,,,,,
";
        let records = load_profiles_from_reader(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].label, "alice");
        assert_eq!(records[0].profile.annual_income, 350_000.0);
        assert!(records[0].profile.id_number.is_none());
        assert!(!records[0].profile.disabled);

        let bob = &records[1].profile;
        assert_eq!(bob.annual_income, 480_000.0);
        assert_eq!(bob.id_number.as_deref(), Some("6001015009087"));
        assert_eq!(bob.medical_dependents, 3);
        assert_eq!(bob.medical_premium_monthly, 4_500.0);
        assert!(bob.disabled);
        assert!(bob.travel_mostly_business);
        // Column absent from the file
        assert_eq!(bob.retirement_contribution, 0.0);

        assert_eq!(records[2].label, "row 3");
        assert_eq!(records[2].profile.age, Some(67));
    }

    #[test]
    fn test_load_sample_file() {
        let records = load_profiles("data/profiles_sample.csv").expect("sample should load");
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r.profile.annual_income > 0.0));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_profiles("no/such/file.csv"),
            Err(ProfileLoadError::Io { .. })
        ));
    }
}
