//! Built-in offline gates.
//!
//! These run at the head of every pipeline and need nothing beyond the
//! domain and method. Each one reports a fatal problem when issuance cannot
//! possibly succeed, so a driver can stop before touching the network.

use crate::checker::{Checker, Evaluation};
use crate::context::ScanContext;
use crate::types::{Problem, ValidationMethod};
use crate::utils::{domain_syntax_error, is_wildcard};
use async_trait::async_trait;

/// Rejects methods outside the known set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidMethodChecker;

#[async_trait]
impl Checker for ValidMethodChecker {
    async fn check(&self, _: &ScanContext, _: &str, method: &ValidationMethod) -> Evaluation {
        if method.is_valid() {
            return Evaluation::clean();
        }

        let supported: Vec<String> = ValidationMethod::known()
            .iter()
            .map(|m| m.to_string())
            .collect();
        Evaluation::success(vec![Problem::fatal(
            "InvalidMethod",
            format!(
                "\"{}\" is not a supported validation method. Supported methods: {}",
                method,
                supported.join(", ")
            ),
            "",
        )])
    }

    fn name(&self) -> &'static str {
        "valid-method"
    }
}

/// Rejects names that cannot be a DNS hostname.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidDomainChecker;

#[async_trait]
impl Checker for ValidDomainChecker {
    async fn check(&self, _: &ScanContext, domain: &str, _: &ValidationMethod) -> Evaluation {
        match domain_syntax_error(domain) {
            None => Evaluation::clean(),
            Some(reason) => Evaluation::success(vec![Problem::fatal(
                "InvalidDomain",
                format!("\"{}\" is not a valid domain name: {}", domain, reason),
                "",
            )]),
        }
    }

    fn name(&self) -> &'static str {
        "valid-domain"
    }
}

/// Flags the TLS-SNI methods, which are known but no longer accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeprecatedMethodChecker;

#[async_trait]
impl Checker for DeprecatedMethodChecker {
    async fn check(&self, _: &ScanContext, _: &str, method: &ValidationMethod) -> Evaluation {
        if *method != ValidationMethod::TLS_SNI_01 && *method != ValidationMethod::TLS_SNI_02 {
            return Evaluation::not_applicable();
        }

        Evaluation::success(vec![Problem::fatal(
            "TLSSNIDisabled",
            format!(
                "The {} validation method has been disabled by certificate authorities. \
                 Use http-01 or dns-01 instead.",
                method
            ),
            "",
        )])
    }

    fn name(&self) -> &'static str {
        "deprecated-method"
    }
}

/// Wildcard names can only be proven over DNS.
#[derive(Debug, Clone, Copy, Default)]
pub struct WildcardDnsOnlyChecker;

#[async_trait]
impl Checker for WildcardDnsOnlyChecker {
    async fn check(&self, _: &ScanContext, domain: &str, method: &ValidationMethod) -> Evaluation {
        if !is_wildcard(domain) {
            return Evaluation::not_applicable();
        }
        if *method == ValidationMethod::DNS_01 {
            return Evaluation::clean();
        }

        Evaluation::success(vec![Problem::fatal(
            "MethodNotSuitable",
            format!(
                "A wildcard domain like {} can only be validated with dns-01, not {}.",
                domain, method
            ),
            "",
        )])
    }

    fn name(&self) -> &'static str {
        "wildcard-dns01-only"
    }
}
