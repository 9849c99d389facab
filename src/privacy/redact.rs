//! Partial redaction of matched values
//!
//! A redacted value keeps just enough of the original to be recognisable in
//! an audit trail. Operates on characters, not bytes.

use super::catalog::{PiiKind, RedactionClass};

/// Mask used for values too short to partially reveal
pub const SHORT_MASK: &str = "****";

fn head(chars: &[char], n: usize) -> String {
    chars.iter().take(n).collect()
}

fn tail(chars: &[char], n: usize) -> String {
    chars[chars.len().saturating_sub(n)..].iter().collect()
}

/// Redact a matched value according to its class
pub fn redact(value: &str, kind: PiiKind) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    if len <= 4 {
        return SHORT_MASK.to_string();
    }

    match kind.redaction_class() {
        RedactionClass::Identifier => {
            format!("{}{}{}", head(&chars, 2), "*".repeat(len - 4), tail(&chars, 2))
        }
        RedactionClass::Phone => format!("{}***{}", head(&chars, 4), tail(&chars, 3)),
        RedactionClass::Email => match value.split_once('@') {
            Some((local, domain)) if !domain.contains('@') => {
                let local: String = local.chars().take(2).collect();
                format!("{}***@{}", local, domain)
            }
            _ => fallback(&chars),
        },
        RedactionClass::Default => fallback(&chars),
    }
}

fn fallback(chars: &[char]) -> String {
    format!("{}***{}", head(chars, 2), tail(chars, 2))
}
