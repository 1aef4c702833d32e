//! Ordered checker pipelines.
//!
//! A [`CheckerPipeline`] is an immutable list of checkers built once and then
//! shared across scans. Ordering is the caller's policy; the pipeline only
//! preserves it.

use crate::checker::{Checker, Evaluation, Outcome};
use crate::checks::{
    DeprecatedMethodChecker, ValidDomainChecker, ValidMethodChecker, WildcardDnsOnlyChecker,
};
use crate::concurrent::ConcurrentCheckerGroup;
use crate::context::ScanContext;
use crate::types::ValidationMethod;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Immutable, ordered sequence of checkers.
#[derive(Clone)]
pub struct CheckerPipeline {
    entries: Arc<[Arc<dyn Checker>]>,
}

impl CheckerPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn entries(&self) -> &[Arc<dyn Checker>] {
        &self.entries
    }

    /// Entry names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for CheckerPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckerPipeline")
            .field("entries", &self.names())
            .finish()
    }
}

/// Walks the entries in order and concatenates their problems.
///
/// The walk only stops early when an entry fails; deciding whether fatal
/// problems from the head of the pipeline should stop a scan is left to the
/// driver.
#[async_trait]
impl Checker for CheckerPipeline {
    async fn check(
        &self,
        ctx: &ScanContext,
        domain: &str,
        method: &ValidationMethod,
    ) -> Evaluation {
        let mut problems = Vec::new();

        for entry in self.entries.iter() {
            let evaluation = entry.check(ctx, domain, method).await;
            debug!(
                checker = entry.name(),
                problems = evaluation.problems.len(),
                not_applicable = evaluation.is_not_applicable(),
                "pipeline entry finished"
            );

            problems.extend(evaluation.problems);
            if let Outcome::Failure(err) = evaluation.outcome {
                return Evaluation::failure(problems, err);
            }
        }

        Evaluation::success(problems)
    }

    fn name(&self) -> &'static str {
        "pipeline"
    }
}

/// Collects entries for a [`CheckerPipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    entries: Vec<Arc<dyn Checker>>,
}

impl PipelineBuilder {
    /// Append a checker that runs on its own.
    pub fn then<C: Checker + 'static>(mut self, checker: C) -> Self {
        self.entries.push(Arc::new(checker));
        self
    }

    /// Append an already shared checker.
    pub fn then_shared(mut self, checker: Arc<dyn Checker>) -> Self {
        self.entries.push(checker);
        self
    }

    /// Append one entry that runs `members` in parallel.
    pub fn then_concurrently(mut self, members: Vec<Arc<dyn Checker>>) -> Self {
        self.entries.push(Arc::new(ConcurrentCheckerGroup::new(members)));
        self
    }

    pub fn build(self) -> CheckerPipeline {
        CheckerPipeline {
            entries: self.entries.into(),
        }
    }
}

/// Network-bound checkers supplied by the embedding driver.
#[derive(Clone)]
pub struct ExternalCheckers {
    pub caa: Arc<dyn Checker>,
    pub dns_records: Arc<dyn Checker>,
    pub http_access: Arc<dyn Checker>,
    pub cdn: Arc<dyn Checker>,
    pub status_page: Arc<dyn Checker>,
    pub txt_records: Arc<dyn Checker>,
    pub rate_limit: Arc<dyn Checker>,
}

/// The four offline gates, in order.
fn with_gates(builder: PipelineBuilder) -> PipelineBuilder {
    builder
        .then(ValidMethodChecker)
        .then(ValidDomainChecker)
        .then(DeprecatedMethodChecker)
        .then(WildcardDnsOnlyChecker)
}

/// The complete scan: gates, CAA, DNS records, then the independent
/// network checks in one concurrent group.
pub fn standard_pipeline(external: ExternalCheckers) -> CheckerPipeline {
    with_gates(CheckerPipeline::builder())
        .then_shared(external.caa)
        .then_shared(external.dns_records)
        .then_concurrently(vec![
            external.http_access,
            external.cdn,
            external.status_page,
            external.txt_records,
            external.rate_limit,
        ])
        .build()
}

/// Only the offline gates. Useful before any network access is available.
pub fn preflight_pipeline() -> CheckerPipeline {
    with_gates(CheckerPipeline::builder()).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;
    use crate::types::Problem;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records the order in which entries are invoked.
    struct Recorder {
        label: &'static str,
        order: Arc<AtomicUsize>,
        seen_at: Arc<AtomicUsize>,
        evaluation: Evaluation,
    }

    #[async_trait]
    impl Checker for Recorder {
        async fn check(&self, _: &ScanContext, _: &str, _: &ValidationMethod) -> Evaluation {
            let position = self.order.fetch_add(1, Ordering::SeqCst);
            self.seen_at.store(position, Ordering::SeqCst);
            self.evaluation.clone()
        }

        fn name(&self) -> &'static str {
            self.label
        }
    }

    fn recorder(
        label: &'static str,
        order: &Arc<AtomicUsize>,
        evaluation: Evaluation,
    ) -> (Recorder, Arc<AtomicUsize>) {
        let seen_at = Arc::new(AtomicUsize::new(usize::MAX));
        (
            Recorder {
                label,
                order: Arc::clone(order),
                seen_at: Arc::clone(&seen_at),
                evaluation,
            },
            seen_at,
        )
    }

    #[tokio::test]
    async fn test_entries_run_in_insertion_order() {
        let order = Arc::new(AtomicUsize::new(0));
        let (first, first_at) = recorder(
            "first",
            &order,
            Evaluation::success(vec![Problem::debug("One", "", "")]),
        );
        let (second, second_at) = recorder("second", &order, Evaluation::not_applicable());
        let (third, third_at) = recorder(
            "third",
            &order,
            Evaluation::success(vec![Problem::debug("Three", "", "")]),
        );

        let pipeline = CheckerPipeline::builder()
            .then(first)
            .then(second)
            .then(third)
            .build();
        assert_eq!(pipeline.names(), vec!["first", "second", "third"]);

        let evaluation = pipeline
            .check(&ScanContext::new(), "example.com", &ValidationMethod::HTTP_01)
            .await;

        assert_eq!(first_at.load(Ordering::SeqCst), 0);
        assert_eq!(second_at.load(Ordering::SeqCst), 1);
        assert_eq!(third_at.load(Ordering::SeqCst), 2);
        let names: Vec<&str> = evaluation.problems.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["One", "Three"]);
        assert_eq!(evaluation.outcome, Outcome::Success);
    }

    #[tokio::test]
    async fn test_failure_stops_walk_and_keeps_problems() {
        let order = Arc::new(AtomicUsize::new(0));
        let (first, _) = recorder(
            "first",
            &order,
            Evaluation::success(vec![Problem::warning("Early", "", "")]),
        );
        let err = CheckError::malfunction("broken", "timeout talking to resolver");
        let (broken, _) = recorder(
            "broken",
            &order,
            Evaluation::failure(vec![Problem::debug("Partial", "", "")], err.clone()),
        );
        let (never, never_at) = recorder("never", &order, Evaluation::clean());

        let pipeline = CheckerPipeline::builder()
            .then(first)
            .then(broken)
            .then(never)
            .build();
        let evaluation = pipeline
            .check(&ScanContext::new(), "example.com", &ValidationMethod::DNS_01)
            .await;

        assert_eq!(evaluation.error(), Some(&err));
        let names: Vec<&str> = evaluation.problems.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Early", "Partial"]);
        assert_eq!(never_at.load(Ordering::SeqCst), usize::MAX);
    }

    #[tokio::test]
    async fn test_preflight_pipeline_reports_gate_findings() {
        let pipeline = preflight_pipeline();
        assert_eq!(
            pipeline.names(),
            vec!["valid-method", "valid-domain", "deprecated-method", "wildcard-dns01-only"]
        );

        let evaluation = pipeline
            .check(
                &ScanContext::new(),
                "*.example.com",
                &ValidationMethod::TLS_SNI_01,
            )
            .await;
        let names: Vec<&str> = evaluation.problems.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["TLSSNIDisabled", "MethodNotSuitable"]);
        assert!(evaluation.problems.iter().all(Problem::is_fatal));
    }

    #[tokio::test]
    async fn test_independent_pipelines_coexist() {
        let empty = CheckerPipeline::builder().build();
        let preflight = preflight_pipeline();

        assert!(empty.is_empty());
        assert_eq!(preflight.len(), 4);
        let evaluation = empty
            .check(&ScanContext::new(), "example.com", &ValidationMethod::HTTP_01)
            .await;
        assert_eq!(evaluation, Evaluation::clean());
    }
}
