//! # ACME Check Library
//!
//! Checker orchestration for diagnosing whether a domain is ready for an ACME
//! challenge method.
//!
//! Every check implements the [`Checker`] contract. Checks are composed into
//! an ordered [`CheckerPipeline`]; checks that do not depend on each other can
//! be bundled into a [`ConcurrentCheckerGroup`] that runs them in parallel and
//! still looks like a single checker to its caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use acme_check_lib::{preflight_pipeline, Checker, ScanContext, ValidationMethod};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = preflight_pipeline();
//!     let ctx = ScanContext::new();
//!     let problems = pipeline
//!         .check(&ctx, "*.example.com", &ValidationMethod::HTTP_01)
//!         .await
//!         .into_result()?;
//!
//!     for problem in problems {
//!         println!("{}", problem);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Outcomes
//!
//! A check either fails (the diagnosis itself could not be made), completes
//! with no problems, or completes with findings. A not-applicable outcome is
//! a completion, never a failure.

// Re-export main public API types and functions
pub use checker::{Checker, Evaluation, Outcome};
pub use checks::{
    DeprecatedMethodChecker, ValidDomainChecker, ValidMethodChecker, WildcardDnsOnlyChecker,
};
pub use concurrent::ConcurrentCheckerGroup;
pub use config::{
    env_config_from, load_env_config, ConfigManager, DefaultsConfig, EnvConfig, FileConfig,
    Settings,
};
pub use context::ScanContext;
pub use error::CheckError;
pub use pipeline::{
    preflight_pipeline, standard_pipeline, CheckerPipeline, ExternalCheckers, PipelineBuilder,
};
pub use types::{is_valid_method, Problem, Severity, ValidationMethod};

// Re-exported so checker implementations do not need their own dependency.
pub use async_trait::async_trait;

mod checker;
mod checks;
mod concurrent;
mod config;
mod context;
mod error;
mod pipeline;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, CheckError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
