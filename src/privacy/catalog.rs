//! Pattern catalog of jurisdiction-sensitive identifier detectors
//!
//! The catalog is a table of [`DetectorSpec`] values compiled once into
//! [`Detector`]s. Iteration order is the declared order, and that order is
//! the order detections are reported in. Adding an identifier class means
//! adding a row to the table; the inspector never branches on the kind.

use super::validate::{validate_medicare, validate_tfn, ChecksumMode};
use crate::error::{GatewayError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Confidence assigned when a class validator accepts the matched digits
pub const VALIDATED_CONFIDENCE: f64 = 0.95;

/// Confidence assigned to a match with no class-specific adjustment
pub const BASE_CONFIDENCE: f64 = 0.70;

/// Identifier class recognised by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiKind {
    /// Medicare card number
    Medicare,
    /// Tax File Number
    Tfn,
    /// State driver's licence number
    DriversLicence,
    /// Australian mobile number
    Mobile,
    /// Four-digit postcode
    Postcode,
    /// Email address
    Email,
    /// Payment card number
    CreditCard,
    /// Bank-State-Branch number
    Bsb,
    /// Bank account number
    BankAccount,
}

impl PiiKind {
    /// Wire name used in detections and audit records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medicare => "medicare",
            Self::Tfn => "tfn",
            Self::DriversLicence => "drivers_licence",
            Self::Mobile => "mobile",
            Self::Postcode => "postcode",
            Self::Email => "email",
            Self::CreditCard => "credit_card",
            Self::Bsb => "bsb",
            Self::BankAccount => "bank_account",
        }
    }

    /// Which redaction rule applies to values of this class
    pub fn redaction_class(&self) -> RedactionClass {
        match self {
            Self::Medicare | Self::Tfn | Self::CreditCard | Self::BankAccount => {
                RedactionClass::Identifier
            }
            Self::Mobile => RedactionClass::Phone,
            Self::Email => RedactionClass::Email,
            Self::DriversLicence | Self::Postcode | Self::Bsb => RedactionClass::Default,
        }
    }
}

impl std::fmt::Display for PiiKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Redaction rule family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedactionClass {
    /// Government, tax and financial numbers: first 2 + last 2 visible
    Identifier,
    /// Phone numbers: first 4 + last 3 visible
    Phone,
    /// Email: first 2 of the local part + full domain visible
    Email,
    /// Everything else: first 2 + last 2 visible
    Default,
}

/// Checksum-style validator for a matched candidate
pub type Validator = fn(&str, ChecksumMode) -> bool;

/// Declarative description of one detector
#[derive(Clone, Copy)]
pub struct DetectorSpec {
    pub kind: PiiKind,
    pub pattern: &'static str,
    pub base_confidence: f64,
    pub validated_confidence: f64,
    pub validator: Option<Validator>,
}

impl std::fmt::Debug for DetectorSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorSpec")
            .field("kind", &self.kind)
            .field("pattern", &self.pattern)
            .field("base_confidence", &self.base_confidence)
            .field("validated_confidence", &self.validated_confidence)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

/// Australian identifier detectors, in reporting order
pub const AUSTRALIAN_DETECTORS: &[DetectorSpec] = &[
    // XXXX XXX XXX or XXXXXXXXXX
    DetectorSpec {
        kind: PiiKind::Medicare,
        pattern: r"\b\d{4}\s?\d{3}\s?\d{3}\b|\b\d{10}\b",
        base_confidence: BASE_CONFIDENCE,
        validated_confidence: VALIDATED_CONFIDENCE,
        validator: Some(validate_medicare as Validator),
    },
    DetectorSpec {
        kind: PiiKind::Tfn,
        pattern: r"\b\d{8,9}\b",
        base_confidence: BASE_CONFIDENCE,
        validated_confidence: VALIDATED_CONFIDENCE,
        validator: Some(validate_tfn as Validator),
    },
    // Prefixed state formats: 8 digits, or a letter followed by 6-8 digits
    DetectorSpec {
        kind: PiiKind::DriversLicence,
        pattern: r"(?i)\b(?:DL|LIC|LICENCE|LICENSE)[\s:]*([A-Z]\d{6,8}|\d{8})\b",
        base_confidence: 0.85,
        validated_confidence: 0.85,
        validator: None,
    },
    DetectorSpec {
        kind: PiiKind::Mobile,
        pattern: r"\b04\d{2}[\s-]?\d{3}[\s-]?\d{3}\b",
        base_confidence: 0.80,
        validated_confidence: 0.80,
        validator: None,
    },
    DetectorSpec {
        kind: PiiKind::Postcode,
        pattern: r"\b\d{4}\b",
        base_confidence: BASE_CONFIDENCE,
        validated_confidence: BASE_CONFIDENCE,
        validator: None,
    },
    DetectorSpec {
        kind: PiiKind::Email,
        pattern: r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b",
        base_confidence: BASE_CONFIDENCE,
        validated_confidence: BASE_CONFIDENCE,
        validator: None,
    },
    DetectorSpec {
        kind: PiiKind::CreditCard,
        pattern: r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b",
        base_confidence: 0.90,
        validated_confidence: 0.90,
        validator: None,
    },
    // XX-XXX
    DetectorSpec {
        kind: PiiKind::Bsb,
        pattern: r"\b\d{2}[\s-]?\d{3}\b",
        base_confidence: BASE_CONFIDENCE,
        validated_confidence: BASE_CONFIDENCE,
        validator: None,
    },
    DetectorSpec {
        kind: PiiKind::BankAccount,
        pattern: r"(?i)\b(?:account|acc)[\s:]*\d{6,10}\b",
        base_confidence: BASE_CONFIDENCE,
        validated_confidence: BASE_CONFIDENCE,
        validator: None,
    },
];

/// A compiled detector
#[derive(Clone)]
pub struct Detector {
    kind: PiiKind,
    regex: Regex,
    base_confidence: f64,
    validated_confidence: f64,
    validator: Option<Validator>,
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("kind", &self.kind)
            .field("pattern", &self.regex.as_str())
            .field("base_confidence", &self.base_confidence)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}

impl Detector {
    /// Compile a detector from its spec
    pub fn compile(spec: &DetectorSpec) -> Result<Self> {
        let regex = Regex::new(spec.pattern).map_err(|e| {
            GatewayError::Config(format!("Invalid pattern for {}: {}", spec.kind, e))
        })?;
        Ok(Self {
            kind: spec.kind,
            regex,
            base_confidence: spec.base_confidence,
            validated_confidence: spec.validated_confidence,
            validator: spec.validator,
        })
    }

    pub fn kind(&self) -> PiiKind {
        self.kind
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Confidence for a matched candidate
    ///
    /// Classes without a validator always get their base confidence.
    pub fn confidence_for(&self, matched: &str, mode: ChecksumMode) -> f64 {
        match self.validator {
            Some(validate) if validate(matched, mode) => self.validated_confidence,
            _ => self.base_confidence,
        }
    }
}

/// Ordered set of compiled detectors
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    detectors: Vec<Detector>,
}

impl PatternCatalog {
    /// Compile a catalog from detector specs, preserving their order
    pub fn new(specs: &[DetectorSpec]) -> Result<Self> {
        let detectors = specs
            .iter()
            .map(Detector::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { detectors })
    }

    /// The built-in Australian catalog
    pub fn australian() -> Result<Self> {
        Self::new(AUSTRALIAN_DETECTORS)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detector> {
        self.detectors.iter()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Kinds in reporting order
    pub fn kinds(&self) -> Vec<PiiKind> {
        self.detectors.iter().map(|d| d.kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_australian_catalog_compiles_in_declared_order() {
        let catalog = PatternCatalog::australian().unwrap();
        assert_eq!(catalog.len(), 9);
        assert_eq!(
            catalog.kinds(),
            vec![
                PiiKind::Medicare,
                PiiKind::Tfn,
                PiiKind::DriversLicence,
                PiiKind::Mobile,
                PiiKind::Postcode,
                PiiKind::Email,
                PiiKind::CreditCard,
                PiiKind::Bsb,
                PiiKind::BankAccount,
            ]
        );
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let spec = DetectorSpec {
            kind: PiiKind::Postcode,
            pattern: r"(\d{4}",
            base_confidence: BASE_CONFIDENCE,
            validated_confidence: BASE_CONFIDENCE,
            validator: None,
        };
        let err = PatternCatalog::new(&[spec]).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
        assert!(err.to_string().contains("postcode"));
    }

    #[test]
    fn test_validated_confidence_applies_to_medicare() {
        let catalog = PatternCatalog::australian().unwrap();
        let medicare = catalog.iter().next().unwrap();
        assert_eq!(medicare.kind(), PiiKind::Medicare);
        assert_eq!(
            medicare.confidence_for("1234 567 890", ChecksumMode::FormatOnly),
            VALIDATED_CONFIDENCE
        );
    }

    #[test]
    fn test_fixed_class_confidences() {
        let catalog = PatternCatalog::australian().unwrap();
        let by_kind = |kind: PiiKind| catalog.iter().find(|d| d.kind() == kind).unwrap();

        assert_eq!(
            by_kind(PiiKind::DriversLicence).confidence_for("DL 12345678", ChecksumMode::FormatOnly),
            0.85
        );
        assert_eq!(
            by_kind(PiiKind::Mobile).confidence_for("0412 345 678", ChecksumMode::FormatOnly),
            0.80
        );
        assert_eq!(
            by_kind(PiiKind::CreditCard)
                .confidence_for("4111 1111 1111 1111", ChecksumMode::FormatOnly),
            0.90
        );
        assert_eq!(
            by_kind(PiiKind::Postcode).confidence_for("2000", ChecksumMode::FormatOnly),
            BASE_CONFIDENCE
        );
    }

    #[test]
    fn test_drivers_licence_is_case_insensitive() {
        let catalog = PatternCatalog::australian().unwrap();
        let dl = catalog
            .iter()
            .find(|d| d.kind() == PiiKind::DriversLicence)
            .unwrap();
        assert!(dl.regex().is_match("licence: a1234567"));
        assert!(dl.regex().is_match("DL 12345678"));
        assert!(!dl.regex().is_match("a1234567"));
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(PiiKind::DriversLicence.as_str(), "drivers_licence");
        assert_eq!(
            serde_json::to_string(&PiiKind::BankAccount).unwrap(),
            "\"bank_account\""
        );
        let kind: PiiKind = serde_json::from_str("\"credit_card\"").unwrap();
        assert_eq!(kind, PiiKind::CreditCard);
    }

    #[test]
    fn test_redaction_classes() {
        assert_eq!(PiiKind::Tfn.redaction_class(), RedactionClass::Identifier);
        assert_eq!(PiiKind::Mobile.redaction_class(), RedactionClass::Phone);
        assert_eq!(PiiKind::Email.redaction_class(), RedactionClass::Email);
        assert_eq!(PiiKind::Bsb.redaction_class(), RedactionClass::Default);
    }
}
