//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a date in the Italian `dd/mm/YYYY` convention.
///
/// Usage in templates: `{{ member.birth_date|date_it }}`
#[askama::filter_fn]
pub fn date_it(value: &chrono::NaiveDate, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.format("%d/%m/%Y").to_string())
}

/// Formats a timestamp in `dd/mm/YYYY HH:MM`.
///
/// Usage in templates: `{{ log.created_at|datetime_it }}`
#[askama::filter_fn]
pub fn datetime_it(
    value: &chrono::DateTime<chrono::Utc>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(value.format("%d/%m/%Y %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    #[test]
    fn date_it_uses_italian_order() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date");
        assert_eq!(date.format("%d/%m/%Y").to_string(), "09/03/2024");
    }
}
