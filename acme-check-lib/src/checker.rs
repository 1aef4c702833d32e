//! The checker contract.
//!
//! Every check, every concurrent group and the pipeline itself implement
//! [`Checker`], so any block of checks can be invoked the same way:
//!
//! ```rust,no_run
//! use acme_check_lib::{preflight_pipeline, Checker, Outcome, ScanContext, ValidationMethod};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pipeline = preflight_pipeline();
//!     let ctx = ScanContext::new();
//!     let evaluation = pipeline
//!         .check(&ctx, "example.com", &ValidationMethod::HTTP_01)
//!         .await;
//!
//!     match evaluation.outcome {
//!         Outcome::Failure(err) => eprintln!("could not check: {}", err),
//!         _ if evaluation.problems.is_empty() => println!("clean"),
//!         _ => println!("{} problem(s)", evaluation.problems.len()),
//!     }
//! }
//! ```

use crate::context::ScanContext;
use crate::error::CheckError;
use crate::types::{Problem, ValidationMethod};
use async_trait::async_trait;

/// How a checker invocation ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The checker ran to completion
    Success,

    /// Nothing this checker looks at applies to the domain and method.
    /// Never a failure, never aborts siblings.
    NotApplicable,

    /// The checker could not complete
    Failure(CheckError),
}

/// Problems found plus how the invocation ended.
///
/// On `Failure`, `problems` holds whatever was gathered before the failure;
/// partial findings are kept rather than discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub problems: Vec<Problem>,
    pub outcome: Outcome,
}

impl Evaluation {
    pub fn success(problems: Vec<Problem>) -> Self {
        Self {
            problems,
            outcome: Outcome::Success,
        }
    }

    /// Shorthand for `success(Vec::new())`.
    pub fn clean() -> Self {
        Self::success(Vec::new())
    }

    pub fn not_applicable() -> Self {
        Self {
            problems: Vec::new(),
            outcome: Outcome::NotApplicable,
        }
    }

    pub fn failure(problems: Vec<Problem>, error: CheckError) -> Self {
        Self {
            problems,
            outcome: Outcome::Failure(error),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failure(_))
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self.outcome, Outcome::NotApplicable)
    }

    pub fn error(&self) -> Option<&CheckError> {
        match &self.outcome {
            Outcome::Failure(err) => Some(err),
            _ => None,
        }
    }

    /// Collapse into a `Result`, dropping partial problems on failure.
    pub fn into_result(self) -> Result<Vec<Problem>, CheckError> {
        match self.outcome {
            Outcome::Failure(err) => Err(err),
            Outcome::Success | Outcome::NotApplicable => Ok(self.problems),
        }
    }
}

/// A single diagnostic check, or a composition of them.
///
/// Implementations must tolerate running at the same time as unrelated
/// checkers sharing the same [`ScanContext`]; any shared mutable state they
/// touch is theirs to synchronize.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Evaluate `domain` for `method` within the scan described by `ctx`.
    async fn check(
        &self,
        ctx: &ScanContext,
        domain: &str,
        method: &ValidationMethod,
    ) -> Evaluation;

    /// Identifies the checker in logs and error messages.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
