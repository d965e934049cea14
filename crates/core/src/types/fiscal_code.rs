//! Italian fiscal code (codice fiscale) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`FiscalCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FiscalCodeError {
    /// The input string is empty.
    #[error("il codice fiscale non può essere vuoto")]
    Empty,
    /// The input does not match the 16-character fiscal code layout.
    #[error("formato codice fiscale non valido")]
    InvalidFormat,
    /// The control character does not match the computed checksum.
    #[error("checksum codice fiscale non valido")]
    InvalidChecksum,
}

/// A validated Italian fiscal code.
///
/// Layout: 6 letters (surname + name), 2 digits (year), 1 letter (month),
/// 2 digits (day + gender offset), 4 alphanumerics (place), 1 control letter.
/// Parsing normalizes to uppercase and verifies the control character.
///
/// ```
/// use easyvol_core::FiscalCode;
///
/// assert!(FiscalCode::parse("RSSMRA85T10A562S").is_ok());
/// assert!(FiscalCode::parse("RSSMRA85T10A562X").is_err()); // bad checksum
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct FiscalCode(String);

/// Checksum contribution of a character in an odd position (1-based).
fn odd_value(c: u8) -> u32 {
    match c {
        b'0' | b'A' => 1,
        b'1' | b'B' => 0,
        b'2' | b'C' => 5,
        b'3' | b'D' => 7,
        b'4' | b'E' => 9,
        b'5' | b'F' => 13,
        b'6' | b'G' => 15,
        b'7' | b'H' => 17,
        b'8' | b'I' => 19,
        b'9' | b'J' => 21,
        b'K' => 2,
        b'L' => 4,
        b'M' => 18,
        b'N' => 20,
        b'O' => 11,
        b'P' => 3,
        b'Q' => 6,
        b'R' => 8,
        b'S' => 12,
        b'T' => 14,
        b'U' => 16,
        b'V' => 10,
        b'W' => 22,
        b'X' => 25,
        b'Y' => 24,
        b'Z' => 23,
        _ => 0,
    }
}

/// Checksum contribution of a character in an even position (1-based).
fn even_value(c: u8) -> u32 {
    match c {
        b'0'..=b'9' => u32::from(c - b'0'),
        b'A'..=b'Z' => u32::from(c - b'A'),
        _ => 0,
    }
}

impl FiscalCode {
    /// Fixed length of a fiscal code.
    pub const LENGTH: usize = 16;

    /// Parse and validate a fiscal code.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, does not match the
    /// 16-character layout, or fails the checksum.
    pub fn parse(s: &str) -> Result<Self, FiscalCodeError> {
        let normalized = s.trim().to_uppercase();

        if normalized.is_empty() {
            return Err(FiscalCodeError::Empty);
        }

        let bytes = normalized.as_bytes();
        if bytes.len() != Self::LENGTH || !Self::matches_layout(bytes) {
            return Err(FiscalCodeError::InvalidFormat);
        }

        let sum: u32 = bytes[..15]
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                // i is 0-based, so even indices are odd positions
                if i % 2 == 0 { odd_value(c) } else { even_value(c) }
            })
            .sum();

        #[allow(clippy::cast_possible_truncation)]
        let check = b'A' + (sum % 26) as u8;
        if check != bytes[15] {
            return Err(FiscalCodeError::InvalidChecksum);
        }

        Ok(Self(normalized))
    }

    /// 6 letters, 2 digits, 1 letter, 2 digits, 4 alphanumerics, 1 letter.
    fn matches_layout(bytes: &[u8]) -> bool {
        bytes[..6].iter().all(u8::is_ascii_uppercase)
            && bytes[6..8].iter().all(u8::is_ascii_digit)
            && bytes[8].is_ascii_uppercase()
            && bytes[9..11].iter().all(u8::is_ascii_digit)
            && bytes[11..15]
                .iter()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            && bytes[15].is_ascii_uppercase()
    }

    /// The normalized (uppercase) code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Gender encoded in the day-of-birth field ('F' when day > 40).
    #[must_use]
    pub fn gender(&self) -> char {
        let day: u32 = self.0[9..11].parse().unwrap_or(0);
        if day > 40 { 'F' } else { 'M' }
    }
}

impl fmt::Display for FiscalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_code() {
        let code = FiscalCode::parse("RSSMRA85T10A562S").expect("valid code");
        assert_eq!(code.as_str(), "RSSMRA85T10A562S");
    }

    #[test]
    fn normalizes_case_and_whitespace() {
        let code = FiscalCode::parse("  rssmra85t10a562s ").expect("valid code");
        assert_eq!(code.as_str(), "RSSMRA85T10A562S");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(FiscalCode::parse(""), Err(FiscalCodeError::Empty));
        assert_eq!(FiscalCode::parse("   "), Err(FiscalCodeError::Empty));
    }

    #[test]
    fn rejects_wrong_layout() {
        assert_eq!(
            FiscalCode::parse("RSSMRA85T10"),
            Err(FiscalCodeError::InvalidFormat)
        );
        assert_eq!(
            FiscalCode::parse("12SMRA85T10A562S"),
            Err(FiscalCodeError::InvalidFormat)
        );
    }

    #[test]
    fn rejects_bad_checksum() {
        assert_eq!(
            FiscalCode::parse("RSSMRA85T10A562X"),
            Err(FiscalCodeError::InvalidChecksum)
        );
    }

    #[test]
    fn decodes_gender_from_day_field() {
        let male = FiscalCode::parse("RSSMRA85T10A562S").expect("valid code");
        assert_eq!(male.gender(), 'M');

        // Day 41 = the 1st with the female +40 offset
        let female = FiscalCode::parse("MRARSS90A41F205C").expect("valid code");
        assert_eq!(female.gender(), 'F');
    }
}
