// SPDX-FileCopyrightText: 2026 Nimbus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Kenyan MSISDN normalization for STK push requests.

use nimbus_core::NimbusError;

/// Normalize a user-supplied phone number to the `2547XXXXXXXX` form the
/// payment API expects.
///
/// A leading `0` is replaced with the `254` country code and a leading `+`
/// is stripped. Anything that does not end up as a 12-digit number starting
/// with `254` is rejected.
pub fn normalize_phone(input: &str) -> Result<String, NimbusError> {
    let trimmed = input.trim();
    let normalized = if let Some(rest) = trimmed.strip_prefix('0') {
        format!("254{rest}")
    } else if let Some(rest) = trimmed.strip_prefix('+') {
        rest.to_string()
    } else {
        trimmed.to_string()
    };

    if !normalized.starts_with("254")
        || normalized.len() != 12
        || !normalized.chars().all(|c| c.is_ascii_digit())
    {
        return Err(NimbusError::Validation(format!(
            "Invalid phone: {trimmed}. Use 2547XXXXXXXX or 07XXXXXXXX"
        )));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_format_gains_country_code() {
        assert_eq!(normalize_phone("0712345678").unwrap(), "254712345678");
    }

    #[test]
    fn plus_prefix_is_stripped() {
        assert_eq!(normalize_phone("+254712345678").unwrap(), "254712345678");
    }

    #[test]
    fn canonical_form_passes_through() {
        assert_eq!(normalize_phone(" 254712345678 ").unwrap(), "254712345678");
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(normalize_phone("25471234567").is_err());
        assert!(normalize_phone("2547123456789").is_err());
    }

    #[test]
    fn foreign_prefix_rejected() {
        assert!(normalize_phone("255712345678").is_err());
    }

    #[test]
    fn non_digit_rejected() {
        assert!(normalize_phone("2547one2345!").is_err());
    }
}
