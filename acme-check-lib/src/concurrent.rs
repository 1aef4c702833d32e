//! Concurrent execution of independent checkers.
//!
//! A [`ConcurrentCheckerGroup`] fans its members out onto separate tokio
//! tasks and folds their findings back into one [`Evaluation`]. Each call
//! builds its own channel set:
//!
//! - a results channel, fed once by every member that completes normally;
//! - a signal channel, fed by members that fail or panic, plus at most one
//!   "all clean" marker from the coordinator once every member has reported
//!   completion;
//! - a completion channel from members to the coordinator.
//!
//! The aggregator consumes exactly one meaningful event per member. The first
//! failure ends the call with whatever has been gathered so far; members that
//! are still running are left to finish and their late sends land in
//! buffered channels nobody reads.

use crate::checker::{Checker, Evaluation, Outcome};
use crate::context::ScanContext;
use crate::error::CheckError;
use crate::types::{Problem, ValidationMethod};
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// `None` is the coordinator's clean marker.
type Signal = Option<CheckError>;

/// A checker composed of members that are run in parallel.
#[derive(Clone)]
pub struct ConcurrentCheckerGroup {
    members: Arc<[Arc<dyn Checker>]>,
}

impl ConcurrentCheckerGroup {
    pub fn new(members: Vec<Arc<dyn Checker>>) -> Self {
        Self {
            members: members.into(),
        }
    }

    pub fn members(&self) -> &[Arc<dyn Checker>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl std::fmt::Debug for ConcurrentCheckerGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.members.iter().map(|m| m.name()).collect();
        f.debug_struct("ConcurrentCheckerGroup")
            .field("members", &names)
            .finish()
    }
}

#[async_trait]
impl Checker for ConcurrentCheckerGroup {
    async fn check(
        &self,
        ctx: &ScanContext,
        domain: &str,
        method: &ValidationMethod,
    ) -> Evaluation {
        let n = self.members.len();
        if n == 0 {
            return Evaluation::clean();
        }

        debug!(domain, %method, members = n, "fanning out checker group");

        let (results_tx, mut results_rx) = mpsc::channel::<Vec<Problem>>(n);
        let (signal_tx, mut signal_rx) = mpsc::channel::<Signal>(n + 1);
        let (done_tx, mut done_rx) = mpsc::channel::<()>(n);

        let coordinator_signal = signal_tx.clone();
        tokio::spawn(async move {
            let mut completed = 0;
            while done_rx.recv().await.is_some() {
                completed += 1;
            }
            // Channel closes once every member task has ended; if any of them
            // skipped its completion report there is nothing to announce.
            if completed == n {
                let _ = coordinator_signal.send(None).await;
            }
        });

        for member in self.members.iter() {
            let member = Arc::clone(member);
            let ctx = ctx.clone();
            let domain = domain.to_string();
            let method = method.clone();
            let results = results_tx.clone();
            let signal = signal_tx.clone();
            let done = done_tx.clone();

            tokio::spawn(async move {
                let name = member.name();
                let caught = AssertUnwindSafe(member.check(&ctx, &domain, &method))
                    .catch_unwind()
                    .await;

                match caught {
                    Ok(Evaluation {
                        outcome: Outcome::Failure(err),
                        ..
                    }) => {
                        warn!(checker = name, error = %err, "checker failed");
                        let _ = signal.send(Some(err)).await;
                    }
                    Ok(evaluation) => {
                        let _ = results.send(evaluation.problems).await;
                        let _ = done.send(()).await;
                    }
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        warn!(checker = name, %message, "checker panicked");
                        let _ = signal
                            .send(Some(CheckError::panicked(name, message)))
                            .await;
                    }
                }
            });
        }

        // Only member tasks and the coordinator may hold senders from here on,
        // so the channels close if every one of them goes away.
        drop(results_tx);
        drop(signal_tx);
        drop(done_tx);

        let mut problems = Vec::new();
        let mut received = 0;

        while received < n {
            tokio::select! {
                Some(found) = results_rx.recv() => {
                    received += 1;
                    problems.extend(found);
                }
                Some(signal) = signal_rx.recv() => match signal {
                    Some(err) => return Evaluation::failure(problems, err),
                    None => debug!("all group members reported completion"),
                },
                else => {
                    return Evaluation::failure(
                        problems,
                        CheckError::internal(format!(
                            "checker group ended after {} of {} members reported",
                            received, n
                        )),
                    );
                }
            }
        }

        debug!(domain, problems = problems.len(), "checker group finished");
        Evaluation::success(problems)
    }

    fn name(&self) -> &'static str {
        "concurrent-group"
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
