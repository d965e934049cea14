//! Deserializers for HTML form and query-string fields.
//!
//! Browsers submit blank optional inputs as empty strings, and cleared
//! `<select>` filters arrive as `status=`. These helpers map the empty
//! string to `None` instead of a 422.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::IntoDeserializer;
use serde::{Deserialize, Deserializer};

/// `Option<T>` for types parseable from a string: dates, datetimes, numbers.
///
/// # Errors
///
/// Fails with the parse error of `T` for a non-empty unparseable value.
pub fn option_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

/// `Option<T>` for unit-variant enums (the status/type selects).
///
/// # Errors
///
/// Fails for a non-empty value that is not a known variant.
pub fn option_variant<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => T::deserialize(s.into_deserializer()).map(Some),
    }
}

/// `Option<Id>` for the newtype IDs behind `<select>` inputs.
///
/// # Errors
///
/// Fails for a non-empty value that is not an integer.
pub fn option_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<i32>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<i32>()
            .map(|id| Some(T::from(id)))
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use easyvol_core::{MemberStatus, UserId};
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct TestForm {
        #[serde(default, deserialize_with = "super::option_from_str")]
        date: Option<NaiveDate>,
        #[serde(default, deserialize_with = "super::option_variant")]
        status: Option<MemberStatus>,
        #[serde(default, deserialize_with = "super::option_id")]
        user_id: Option<UserId>,
    }

    #[test]
    fn empty_strings_become_none() {
        let form: TestForm =
            serde_urlencoded::from_str("date=&status=&user_id=").expect("deserialize");
        assert!(form.date.is_none());
        assert!(form.status.is_none());
        assert!(form.user_id.is_none());
    }

    #[test]
    fn missing_fields_become_none() {
        let form: TestForm = serde_urlencoded::from_str("").expect("deserialize");
        assert!(form.date.is_none());
        assert!(form.status.is_none());
    }

    #[test]
    fn populated_fields_parse() {
        let form: TestForm =
            serde_urlencoded::from_str("date=2024-03-09&status=attivo&user_id=7")
                .expect("deserialize");
        assert_eq!(form.date, NaiveDate::from_ymd_opt(2024, 3, 9));
        assert_eq!(form.status, Some(MemberStatus::Attivo));
        assert_eq!(form.user_id, Some(UserId::new(7)));
    }

    #[test]
    fn garbage_values_are_rejected() {
        assert!(serde_urlencoded::from_str::<TestForm>("date=not-a-date").is_err());
        assert!(serde_urlencoded::from_str::<TestForm>("status=sconosciuto").is_err());
    }
}
