use crate::error::BotError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of digits in a payment reference (UTR).
pub const REFERENCE_LEN: usize = 12;

/// A payment reference code claimed by a user.
///
/// Only the shape is checked: exactly twelve ASCII digits. The code is never
/// matched against a payment ledger, and the same code may back several orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReferenceCode(String);

impl ReferenceCode {
    /// Validates user input. Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Result<Self, BotError> {
        let candidate = input.trim();
        if candidate.len() == REFERENCE_LEN && candidate.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(BotError::ValidationError(format!(
                "reference code must be exactly {REFERENCE_LEN} digits"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ReferenceCode {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReferenceCode {
    type Error = BotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ReferenceCode> for String {
    fn from(code: ReferenceCode) -> Self {
        code.0
    }
}

impl fmt::Display for ReferenceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_twelve_digits() {
        let code = ReferenceCode::parse("123456789012").unwrap();
        assert_eq!(code.as_str(), "123456789012");
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        let code = ReferenceCode::parse("  000000000001\n").unwrap();
        assert_eq!(code.as_str(), "000000000001");
    }

    #[test]
    fn test_rejects_wrong_length() {
        for input in ["", "12345678901", "1234567890123", "1"] {
            assert!(
                matches!(ReferenceCode::parse(input), Err(BotError::ValidationError(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_non_digits() {
        for input in ["12345678901a", "1234 5678901", "+12345678901", "12345678901.", "UTR123456789"] {
            assert!(ReferenceCode::parse(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn test_rejects_non_ascii_digits() {
        // Arabic-Indic and fullwidth digits are numeric but not ASCII.
        assert!(ReferenceCode::parse("١٢٣٤٥٦٧٨٩٠١٢").is_err());
        assert!(ReferenceCode::parse("１２３４５６７８９０１２").is_err());
    }

    #[test]
    fn test_deserialization_validates() {
        let ok: ReferenceCode = serde_json::from_str("\"999999999999\"").unwrap();
        assert_eq!(ok.to_string(), "999999999999");
        assert!(serde_json::from_str::<ReferenceCode>("\"abc\"").is_err());
    }
}
