//! Checksum routines for numeric identifier classes
//!
//! In [`ChecksumMode::FormatOnly`] (the default) a candidate is accepted when
//! it has the right shape; the check digit is computed but not enforced.
//! [`ChecksumMode::Strict`] enforces it. Validation only moves a detection's
//! confidence, never whether the detection exists.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Medicare weights applied to the first eight digits
const MEDICARE_WEIGHTS: [u32; 8] = [1, 3, 7, 9, 1, 3, 7, 9];

/// TFN weights for nine-digit numbers
const TFN_WEIGHTS_9: [u32; 9] = [1, 4, 3, 7, 5, 8, 6, 9, 10];

/// TFN weights for legacy eight-digit numbers
const TFN_WEIGHTS_8: [u32; 8] = [10, 7, 8, 4, 6, 3, 5, 1];

/// How strictly identifier checksums are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumMode {
    /// Accept any well-formed candidate
    #[default]
    FormatOnly,
    /// Require the check digit to verify
    Strict,
}

fn nd_class() -> Option<&'static Regex> {
    static ND: OnceLock<Option<Regex>> = OnceLock::new();
    ND.get_or_init(|| Regex::new(r"^\p{Nd}$").ok()).as_ref()
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    nd_class().is_some_and(|nd| nd.is_match(c.encode_utf8(&mut buf)))
}

/// Value of a decimal digit in any script.
///
/// Decimal digits are encoded as contiguous runs of 0..9, so the value is
/// the distance from the start of the run, modulo ten.
fn decimal_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }
    let mut offset = 0u32;
    let mut code = c as u32;
    while let Some(prev) = code.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        offset += 1;
        code -= 1;
    }
    Some(offset % 10)
}

/// Digits of a candidate with whitespace removed, or `None` if anything
/// other than decimal digits remains
fn digits(candidate: &str) -> Option<Vec<u32>> {
    candidate
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(decimal_value)
        .collect()
}

/// Medicare check digit (9th digit) for the first eight digits
pub fn medicare_check_digit(digits: &[u32]) -> Option<u32> {
    if digits.len() < 8 {
        return None;
    }
    let total: u32 = digits
        .iter()
        .zip(MEDICARE_WEIGHTS.iter())
        .map(|(d, w)| d * w)
        .sum();
    Some(total % 10)
}

/// Whether a TFN digit sequence satisfies the weighted modulus-11 rule
pub fn tfn_checksum_ok(digits: &[u32]) -> bool {
    let weights: &[u32] = match digits.len() {
        9 => &TFN_WEIGHTS_9,
        8 => &TFN_WEIGHTS_8,
        _ => return false,
    };
    let total: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    total % 11 == 0
}

/// Validate a Medicare candidate: ten digits, optionally space separated
pub fn validate_medicare(candidate: &str, mode: ChecksumMode) -> bool {
    let Some(digits) = digits(candidate) else {
        return false;
    };
    if digits.len() != 10 {
        return false;
    }

    let checksum_ok = medicare_check_digit(&digits) == Some(digits[8]);
    tracing::trace!(checksum_ok, ?mode, "Medicare checksum computed");

    match mode {
        ChecksumMode::FormatOnly => true,
        ChecksumMode::Strict => checksum_ok,
    }
}

/// Validate a TFN candidate: eight or nine digits
pub fn validate_tfn(candidate: &str, mode: ChecksumMode) -> bool {
    let Some(digits) = digits(candidate) else {
        return false;
    };
    if digits.len() != 8 && digits.len() != 9 {
        return false;
    }

    let checksum_ok = tfn_checksum_ok(&digits);
    tracing::trace!(checksum_ok, ?mode, "TFN checksum computed");

    match mode {
        ChecksumMode::FormatOnly => true,
        ChecksumMode::Strict => checksum_ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medicare_rejects_wrong_length() {
        assert!(!validate_medicare("123", ChecksumMode::FormatOnly));
        assert!(!validate_medicare("123456789012", ChecksumMode::FormatOnly));
        assert!(!validate_medicare("", ChecksumMode::FormatOnly));
    }

    #[test]
    fn test_medicare_format_only_accepts_bad_checksum() {
        // check digit should be 8
        assert!(validate_medicare("1234 567 890", ChecksumMode::FormatOnly));
        assert!(validate_medicare("1234 567 810", ChecksumMode::FormatOnly));
    }

    #[test]
    fn test_medicare_strict() {
        assert!(validate_medicare("1234 567 880", ChecksumMode::Strict));
        assert!(validate_medicare("1234567880", ChecksumMode::Strict));
        assert!(!validate_medicare("1234 567 890", ChecksumMode::Strict));
        assert!(!validate_medicare("1234 567 810", ChecksumMode::Strict));
    }

    #[test]
    fn test_medicare_rejects_non_digits() {
        assert!(!validate_medicare("1234-567-890", ChecksumMode::FormatOnly));
        assert!(!validate_medicare("12a4567890", ChecksumMode::FormatOnly));
    }

    #[test]
    fn test_tfn_rejects_wrong_length() {
        assert!(!validate_tfn("123", ChecksumMode::FormatOnly));
        assert!(!validate_tfn("123456789012", ChecksumMode::FormatOnly));
    }

    #[test]
    fn test_tfn_format_only() {
        assert!(validate_tfn("123456789", ChecksumMode::FormatOnly));
        assert!(validate_tfn("12345678", ChecksumMode::FormatOnly));
    }

    #[test]
    fn test_tfn_strict() {
        assert!(validate_tfn("123456782", ChecksumMode::Strict));
        assert!(validate_tfn("123 456 782", ChecksumMode::Strict));
        assert!(!validate_tfn("123456789", ChecksumMode::Strict));
    }

    #[test]
    fn test_decimal_value_across_scripts() {
        assert_eq!(decimal_value('7'), Some(7));
        assert_eq!(decimal_value('\u{0660}'), Some(0));
        assert_eq!(decimal_value('\u{0669}'), Some(9));
        assert_eq!(decimal_value('\u{096A}'), Some(4));
        assert_eq!(decimal_value('\u{FF18}'), Some(8));
        // mathematical digits: five 0..9 runs back to back
        assert_eq!(decimal_value('\u{1D7D7}'), Some(9));
        assert_eq!(decimal_value('\u{1D7D8}'), Some(0));
        assert_eq!(decimal_value('\u{1D7FF}'), Some(9));
        assert_eq!(decimal_value('a'), None);
        assert_eq!(decimal_value('\u{00B2}'), None);
        assert_eq!(decimal_value('\u{2163}'), None);
    }

    #[test]
    fn test_non_ascii_digits_validate() {
        // 1234 567 880 in Arabic-Indic digits
        let arabic = "\u{0661}\u{0662}\u{0663}\u{0664} \u{0665}\u{0666}\u{0667} \u{0668}\u{0668}\u{0660}";
        assert!(validate_medicare(arabic, ChecksumMode::Strict));
        // 123456782 in fullwidth digits
        let fullwidth = "\u{FF11}\u{FF12}\u{FF13}\u{FF14}\u{FF15}\u{FF16}\u{FF17}\u{FF18}\u{FF12}";
        assert!(validate_tfn(fullwidth, ChecksumMode::Strict));
    }

    #[test]
    fn test_medicare_check_digit_needs_eight_digits() {
        assert_eq!(medicare_check_digit(&[1, 2, 3]), None);
        assert_eq!(medicare_check_digit(&[1, 2, 3, 4, 5, 6, 7, 8]), Some(8));
    }
}
