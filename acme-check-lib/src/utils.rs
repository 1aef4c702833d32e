//! Utility functions for domain name handling.
//!
//! Helpers for the syntax checks performed by the offline gates.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LABEL: Regex =
        Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").expect("label pattern is valid");
}

/// Maximum length of a presentation-format domain name.
const MAX_DOMAIN_LEN: usize = 253;

/// Maximum length of a single label.
const MAX_LABEL_LEN: usize = 63;

/// Whether the name asks for a wildcard certificate.
pub fn is_wildcard(domain: &str) -> bool {
    domain.trim().starts_with("*.")
}

/// Explain why `domain` is not a usable hostname, or `None` if it is.
///
/// A single leading `*.` and a single trailing `.` are accepted. Labels must
/// be ASCII letters, digits and hyphens (internationalized names need to be
/// given in their `xn--` form).
pub fn domain_syntax_error(domain: &str) -> Option<String> {
    let name = domain.trim();
    let name = name.strip_prefix("*.").unwrap_or(name);
    let name = name.strip_suffix('.').unwrap_or(name);

    if name.is_empty() {
        return Some("the name is empty".to_string());
    }

    if name.len() > MAX_DOMAIN_LEN {
        return Some(format!("longer than {} characters", MAX_DOMAIN_LEN));
    }

    let labels: Vec<&str> = name.split('.').collect();
    if labels.len() < 2 {
        return Some("a domain needs at least two labels".to_string());
    }

    for label in labels {
        if label.is_empty() {
            return Some("contains an empty label".to_string());
        }

        if label.len() > MAX_LABEL_LEN {
            return Some(format!(
                "label '{}' is longer than {} characters",
                label, MAX_LABEL_LEN
            ));
        }

        if !LABEL.is_match(&label.to_ascii_lowercase()) {
            return Some(format!(
                "label '{}' must use letters, digits and inner hyphens only",
                label
            ));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_wildcard() {
        assert!(is_wildcard("*.example.com"));
        assert!(!is_wildcard("example.com"));
        assert!(!is_wildcard("a*.example.com"));
    }

    #[test]
    fn test_valid_names() {
        assert_eq!(domain_syntax_error("example.com"), None);
        assert_eq!(domain_syntax_error("test.co.uk"), None);
        assert_eq!(domain_syntax_error("*.example.com"), None);
        assert_eq!(domain_syntax_error("example.com."), None);
        assert_eq!(domain_syntax_error("EXAMPLE.com"), None);
        assert_eq!(domain_syntax_error("a-b.c1.io"), None);
    }

    #[test]
    fn test_invalid_names() {
        assert!(domain_syntax_error("").is_some());
        assert!(domain_syntax_error("*.").is_some());
        assert!(domain_syntax_error("example").is_some());
        assert!(domain_syntax_error(".com").is_some());
        assert!(domain_syntax_error("example-.com").is_some());
        assert!(domain_syntax_error("ex_ample.com").is_some());
        assert!(domain_syntax_error("bücher.de").is_some());
    }

    #[test]
    fn test_length_limits() {
        let long_label = format!("{}.com", "a".repeat(64));
        assert!(domain_syntax_error(&long_label)
            .unwrap()
            .contains("longer than 63"));

        let long_name = format!("{}.com", vec!["abcdefghi"; 26].join("."));
        assert!(long_name.len() > 253);
        assert!(domain_syntax_error(&long_name)
            .unwrap()
            .contains("longer than 253"));
    }
}
