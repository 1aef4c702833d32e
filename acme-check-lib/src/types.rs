//! Core data types for challenge readiness checking.
//!
//! This module defines the validation methods a scan can target and the
//! problems that checkers report back to the operator.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

lazy_static! {
    /// Every method literal the system recognizes.
    ///
    /// Some of these are later refused by policy (see the deprecated-method
    /// gate), so membership here means "known", not "allowed".
    static ref VALID_METHODS: HashSet<&'static str> =
        ["http-01", "dns-01", "tls-sni-01", "tls-sni-02"].into_iter().collect();
}

/// Returns true exactly for the four known method literals.
pub fn is_valid_method(method: &str) -> bool {
    VALID_METHODS.contains(method)
}

/// An ACME challenge method, as requested by the operator.
///
/// The value keeps the literal it was created from so that an unknown method
/// can still travel through the pipeline and be rejected by the
/// method-validity gate with a proper finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationMethod(Cow<'static, str>);

impl ValidationMethod {
    pub const HTTP_01: ValidationMethod = ValidationMethod(Cow::Borrowed("http-01"));
    pub const DNS_01: ValidationMethod = ValidationMethod(Cow::Borrowed("dns-01"));
    pub const TLS_SNI_01: ValidationMethod = ValidationMethod(Cow::Borrowed("tls-sni-01"));
    pub const TLS_SNI_02: ValidationMethod = ValidationMethod(Cow::Borrowed("tls-sni-02"));

    /// Wrap an arbitrary literal without validating it.
    pub fn new<S: Into<String>>(literal: S) -> Self {
        Self(Cow::Owned(literal.into()))
    }

    /// The four known methods in declaration order.
    pub fn known() -> [ValidationMethod; 4] {
        [
            Self::HTTP_01,
            Self::DNS_01,
            Self::TLS_SNI_01,
            Self::TLS_SNI_02,
        ]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the known method literals.
    pub fn is_valid(&self) -> bool {
        is_valid_method(self.as_str())
    }
}

impl fmt::Display for ValidationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMethod {
    type Err = std::convert::Infallible;

    /// Parsing never fails; validity is a separate question.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

impl Default for ValidationMethod {
    fn default() -> Self {
        Self::HTTP_01
    }
}

/// How serious a problem is for the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Issuance cannot succeed until this is fixed
    #[serde(rename = "fatal")]
    Fatal,

    /// Issuance is likely to fail
    #[serde(rename = "error")]
    Error,

    /// Worth knowing, may not block issuance
    #[serde(rename = "warning")]
    Warning,

    /// Diagnostic detail only
    #[serde(rename = "debug")]
    Debug,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Debug => "debug",
        };
        f.write_str(label)
    }
}

/// A finding produced by a checker.
///
/// Problems are plain values. Aggregation concatenates them and never
/// deduplicates or reorders what a single checker produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Problem {
    /// Short machine-friendly identifier (e.g., "InvalidDomain")
    pub name: String,

    /// Human readable explanation of what is wrong
    pub explanation: String,

    /// Supporting detail (raw values, records, responses)
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub detail: String,

    pub severity: Severity,
}

impl Problem {
    pub fn new<N, E, D>(name: N, explanation: E, detail: D, severity: Severity) -> Self
    where
        N: Into<String>,
        E: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            explanation: explanation.into(),
            detail: detail.into(),
            severity,
        }
    }

    pub fn fatal<N: Into<String>, E: Into<String>, D: Into<String>>(
        name: N,
        explanation: E,
        detail: D,
    ) -> Self {
        Self::new(name, explanation, detail, Severity::Fatal)
    }

    pub fn error<N: Into<String>, E: Into<String>, D: Into<String>>(
        name: N,
        explanation: E,
        detail: D,
    ) -> Self {
        Self::new(name, explanation, detail, Severity::Error)
    }

    pub fn warning<N: Into<String>, E: Into<String>, D: Into<String>>(
        name: N,
        explanation: E,
        detail: D,
    ) -> Self {
        Self::new(name, explanation, detail, Severity::Warning)
    }

    pub fn debug<N: Into<String>, E: Into<String>, D: Into<String>>(
        name: N,
        explanation: E,
        detail: D,
    ) -> Self {
        Self::new(name, explanation, detail, Severity::Debug)
    }

    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.name, self.explanation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_methods_are_valid() {
        for literal in ["http-01", "dns-01", "tls-sni-01", "tls-sni-02"] {
            assert!(is_valid_method(literal), "{} should be valid", literal);
        }
    }

    #[test]
    fn test_near_misses_are_invalid() {
        for literal in ["http-02", "", "HTTP-01", "dns01", "tls-alpn-01", " http-01"] {
            assert!(!is_valid_method(literal), "{:?} should be invalid", literal);
        }
    }

    #[test]
    fn test_method_constants_match_literals() {
        let literals: Vec<String> = ValidationMethod::known()
            .iter()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(literals, vec!["http-01", "dns-01", "tls-sni-01", "tls-sni-02"]);
        assert!(ValidationMethod::known().iter().all(|m| m.is_valid()));
    }

    #[test]
    fn test_parse_keeps_unknown_literal() {
        let method: ValidationMethod = "http-02".parse().unwrap();
        assert_eq!(method.as_str(), "http-02");
        assert!(!method.is_valid());

        let method: ValidationMethod = " dns-01 ".parse().unwrap();
        assert_eq!(method, ValidationMethod::DNS_01);
    }

    #[test]
    fn test_problem_serializes_without_empty_detail() {
        let problem = Problem::fatal("InvalidDomain", "bad name", "");
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["severity"], "fatal");
        assert!(json.get("detail").is_none());
    }

    #[test]
    fn test_problem_display() {
        let problem = Problem::warning("NoAAAA", "No AAAA records", "");
        assert_eq!(problem.to_string(), "[warning] NoAAAA: No AAAA records");
        assert!(!problem.is_fatal());
    }
}
