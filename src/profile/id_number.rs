//! Age resolution from South African identity numbers
//!
//! Only the leading `YYMMDD` birth date is used; the remaining seven digits
//! (gender sequence, citizenship, checksum) are not inspected.

use chrono::{Datelike, NaiveDate};

/// Age assumed when neither an explicit age nor a usable ID number is given
pub const DEFAULT_AGE: u32 = 30;

const ID_LENGTH: usize = 13;

/// Birth date encoded in a 13-digit identity number.
///
/// A two-digit year at or below the current two-digit year is read as this
/// century, anything above it as the previous one. Returns `None` for
/// anything that is not exactly 13 digits, for impossible calendar dates and
/// for birth dates after `today`.
pub fn birth_date_from_id(id_number: &str, today: NaiveDate) -> Option<NaiveDate> {
    let id = id_number.trim();
    if id.len() != ID_LENGTH || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let yy: i32 = id[0..2].parse().ok()?;
    let month: u32 = id[2..4].parse().ok()?;
    let day: u32 = id[4..6].parse().ok()?;

    let century = today.year() - today.year().rem_euclid(100);
    let year = if yy <= today.year().rem_euclid(100) {
        century + yy
    } else {
        century - 100 + yy
    };

    NaiveDate::from_ymd_opt(year, month, day).filter(|birth| *birth <= today)
}

/// Completed years between `birth` and `today`
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Age to use for a calculation: explicit age first, then the ID number,
/// then `default_age`
pub fn resolve_age(
    explicit: Option<u32>,
    id_number: Option<&str>,
    today: NaiveDate,
    default_age: u32,
) -> u32 {
    if let Some(age) = explicit {
        return age;
    }

    match id_number.filter(|id| !id.trim().is_empty()) {
        Some(id) => match birth_date_from_id(id, today) {
            Some(birth) => age_on(birth, today),
            None => {
                log::warn!("unusable ID number, assuming age {}", default_age);
                default_age
            }
        },
        None => default_age,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_birth_date_century_pivot() {
        let today = date(2025, 6, 15);
        assert_eq!(birth_date_from_id("8001015009087", today), Some(date(1980, 1, 1)));
        assert_eq!(birth_date_from_id("0503125009087", today), Some(date(2005, 3, 12)));
        // 25 is the current two-digit year, so it stays in this century
        assert_eq!(birth_date_from_id("2501015009087", today), Some(date(2025, 1, 1)));
        assert_eq!(birth_date_from_id("2601015009087", today), Some(date(1926, 1, 1)));
    }

    #[test]
    fn test_birth_date_rejects_malformed() {
        let today = date(2025, 6, 15);
        assert_eq!(birth_date_from_id("800101500908", today), None);
        assert_eq!(birth_date_from_id("80010150090871", today), None);
        assert_eq!(birth_date_from_id("80010150O9087", today), None);
        assert_eq!(birth_date_from_id("8013015009087", today), None);
        assert_eq!(birth_date_from_id("8002305009087", today), None);
        // Later this year has not happened yet
        assert_eq!(birth_date_from_id("2512015009087", today), None);
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        let birth = date(1960, 6, 15);
        assert_eq!(age_on(birth, date(2025, 6, 14)), 64);
        assert_eq!(age_on(birth, date(2025, 6, 15)), 65);
        assert_eq!(age_on(birth, date(2025, 12, 31)), 65);
    }

    #[test]
    fn test_resolve_age_precedence() {
        let today = date(2025, 6, 15);
        assert_eq!(resolve_age(Some(70), Some("8001015009087"), today, DEFAULT_AGE), 70);
        assert_eq!(resolve_age(None, Some("8001015009087"), today, DEFAULT_AGE), 45);
        assert_eq!(resolve_age(None, Some("not an id"), today, DEFAULT_AGE), 30);
        assert_eq!(resolve_age(None, Some(""), today, DEFAULT_AGE), 30);
        assert_eq!(resolve_age(None, None, today, 40), 40);
    }
}
