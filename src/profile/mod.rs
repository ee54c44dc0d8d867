//! Calculator inputs and form-input handling

mod data;
mod amount;
mod id_number;
pub mod loader;

pub use data::{LoanCategory, LoanProfile, TaxProfile};
pub use amount::{clean_amount, format_percent, format_rand, parse_amount, parse_count, parse_flag};
pub use id_number::{age_on, birth_date_from_id, resolve_age, DEFAULT_AGE};
pub use loader::{load_profiles, load_profiles_from_reader, ProfileLoadError, ProfileRecord};
