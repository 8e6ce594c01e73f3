//! Regex patterns shared by request validation.

use once_cell::sync::Lazy;
use regex::Regex;

/// `#RRGGBB`
pub static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

/// Seven `0`/`1` characters, Monday first
pub static WORK_DAYS_MASK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[01]{7}$").expect("valid work days regex"));

/// Digits with optional leading `+` and the usual separators
pub static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9()\-\s]{8,20}$").expect("valid phone regex"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert!(HEX_COLOR.is_match("#007BFF"));
        assert!(HEX_COLOR.is_match("#a1b2c3"));
        assert!(!HEX_COLOR.is_match("007BFF"));
        assert!(!HEX_COLOR.is_match("#07F"));
    }

    #[test]
    fn test_phone() {
        assert!(PHONE.is_match("(11) 98765-4321"));
        assert!(PHONE.is_match("+5511987654321"));
        assert!(!PHONE.is_match("call me"));
    }
}
