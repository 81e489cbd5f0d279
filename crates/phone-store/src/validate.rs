//! US phone number normalization.

use crate::error::StoreError;

/// Normalize a raw phone number to `DDD-DDD-DDDD`.
///
/// Every non-digit character is dropped. An 11-digit result with a leading
/// country code `1` loses that digit; anything that is not then exactly ten
/// digits is rejected.
pub fn normalize_phone_number(raw: &str) -> Result<String, StoreError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    let digits = match digits.strip_prefix('1') {
        Some(rest) if digits.len() == 11 => rest,
        _ => digits.as_str(),
    };

    if digits.len() != 10 {
        return Err(StoreError::InvalidNumberFormat(raw.to_string()));
    }

    Ok(format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]))
}
