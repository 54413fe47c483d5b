//! Danish business registration numbers (CVR)

use std::fmt;

/// Number of digits in a canonical CVR number
pub const CVR_LENGTH: usize = 8;

const WEIGHTS: [u32; CVR_LENGTH] = [2, 7, 6, 5, 4, 3, 2, 1];

/// A validated CVR number in canonical eight digit form
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Cvr(String);

impl Cvr {
    /// Parse a raw token as a CVR number
    ///
    /// An optional `DK` VAT prefix is accepted. Returns `None` when the token
    /// is not eight digits, starts with zero, or fails the modulus-11 control.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let token = raw.trim();
        let token = match token.get(..2) {
            Some(prefix) if prefix.eq_ignore_ascii_case("dk") => token[2..].trim_start(),
            _ => token,
        };

        if token.len() != CVR_LENGTH
            || !token.bytes().all(|b| b.is_ascii_digit())
            || token.starts_with('0')
        {
            return None;
        }

        let sum: u32 = token
            .bytes()
            .zip(WEIGHTS)
            .map(|(b, w)| u32::from(b - b'0') * w)
            .sum();

        (sum % 11 == 0).then(|| Self(token.to_string()))
    }

    /// The canonical digit string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cvr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
