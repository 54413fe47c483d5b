//! Danish personal identification numbers (CPR)
//!
//! A CPR number is `DDMMYY` followed by a four digit serial. The first serial
//! digit together with `YY` decides the century of the birth date.

use std::fmt;

use chrono::NaiveDate;

/// Number of digits in a canonical CPR number
pub const CPR_LENGTH: usize = 10;

/// Weights for the legacy modulus-11 control
const MOD11_WEIGHTS: [u32; CPR_LENGTH] = [4, 3, 2, 7, 6, 5, 4, 3, 2, 1];

/// Why a CPR-shaped token was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CprRejection {
    /// Not ten digits (optionally split by a hyphen after the sixth)
    Format,
    /// Ten digits, but `DDMMYY` is not a real date
    BirthDate,
}

/// A validated CPR number in canonical ten digit form
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Cpr {
    digits: String,
    #[serde(skip)]
    birth_date: NaiveDate,
}

impl Cpr {
    /// Parse a raw token as a CPR number
    ///
    /// Accepts `DDMMYYSSSS` and `DDMMYY-SSSS`. Leading zeros are kept.
    pub fn parse(raw: &str) -> Result<Self, CprRejection> {
        let digits = canonical_digits(raw.trim()).ok_or(CprRejection::Format)?;
        let birth_date = birth_date_of(&digits).ok_or(CprRejection::BirthDate)?;
        Ok(Self { digits, birth_date })
    }

    /// The canonical digit string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.digits
    }

    /// Birth date encoded in the number
    #[must_use]
    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    /// Whether the number passes the pre-2007 modulus-11 control
    ///
    /// Numbers issued after 2007 may legitimately fail this check, so it is
    /// not part of validation.
    #[must_use]
    pub fn mod11_valid(&self) -> bool {
        mod11_valid(&self.digits)
    }
}

impl fmt::Display for Cpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.digits)
    }
}

/// Strip an optional hyphen and check that exactly ten ASCII digits remain
fn canonical_digits(token: &str) -> Option<String> {
    let bytes = token.as_bytes();
    let digits: String = match bytes.len() {
        10 => token.to_string(),
        11 if bytes[6] == b'-' => format!("{}{}", &token[..6], &token[7..]),
        _ => return None,
    };

    if digits.len() == CPR_LENGTH && digits.bytes().all(|b| b.is_ascii_digit()) {
        Some(digits)
    } else {
        None
    }
}

/// Resolve the full birth year from `YY` and the first serial digit
fn century_year(yy: u32, serial_digit: u32) -> i32 {
    let century = match serial_digit {
        0..=3 => 1900,
        4 | 9 => {
            if yy <= 36 {
                2000
            } else {
                1900
            }
        }
        _ => {
            if yy <= 57 {
                2000
            } else {
                1800
            }
        }
    };
    century + yy as i32
}

fn two_digits(digits: &str, at: usize) -> Option<u32> {
    digits.get(at..at + 2)?.parse().ok()
}

fn birth_date_of(digits: &str) -> Option<NaiveDate> {
    let day = two_digits(digits, 0)?;
    let month = two_digits(digits, 2)?;
    let yy = two_digits(digits, 4)?;
    let serial_digit = digits.as_bytes().get(6).map(|b| u32::from(b - b'0'))?;
    NaiveDate::from_ymd_opt(century_year(yy, serial_digit), month, day)
}

/// Legacy modulus-11 control over ten digits
#[must_use]
pub fn mod11_valid(digits: &str) -> bool {
    if digits.len() != CPR_LENGTH || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = digits
        .bytes()
        .zip(MOD11_WEIGHTS)
        .map(|(b, w)| u32::from(b - b'0') * w)
        .sum();
    sum % 11 == 0
}
