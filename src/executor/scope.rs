//! Deadline and cancellation shared by every database operation of a run.
//!
//! All operations of one run draw from a single time budget: the deadline is
//! fixed when the scope is created, not per call. A `CancellationToken`
//! (tripped by Ctrl+C) aborts whatever operation is outstanding.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ConnectivityError, Result};

/// Bounded-duration context passed explicitly into each operation.
#[derive(Debug, Clone)]
pub struct OperationScope {
    deadline: Instant,
    budget: Duration,
    cancel_token: CancellationToken,
}

impl OperationScope {
    /// Start a scope whose deadline is `budget` from now
    pub fn new(budget: Duration) -> Self {
        Self::with_cancel_token(budget, CancellationToken::new())
    }

    /// Start a scope driven by an existing cancellation token
    pub fn with_cancel_token(budget: Duration, cancel_token: CancellationToken) -> Self {
        Self {
            deadline: Instant::now() + budget,
            budget,
            cancel_token,
        }
    }

    /// Total budget the scope was created with
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time left before the deadline
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Token that cancels every operation run in this scope
    pub fn get_cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Cancel all outstanding and future operations of this scope
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Run `fut` under the scope's deadline and cancellation
    ///
    /// # Arguments
    /// * `operation` - Name reported in timeout/cancellation errors
    /// * `fut` - The operation
    ///
    /// # Returns
    /// * `Result<T>` - The operation's own result, or a connectivity error if
    ///   the deadline passed or the scope was cancelled first
    pub async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        debug!(operation, remaining = ?self.remaining(), "starting operation");

        tokio::select! {
            biased;

            _ = self.cancel_token.cancelled() => {
                Err(ConnectivityError::Cancelled { operation }.into())
            }
            res = tokio::time::timeout_at(self.deadline, fut) => match res {
                Ok(inner) => inner,
                Err(_) => Err(ConnectivityError::Timeout {
                    operation,
                    after: self.budget,
                }
                .into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrgUsersError;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_completes_within_budget() {
        let scope = OperationScope::new(Duration::from_secs(5));
        let value = assert_ok!(
            scope
                .run("resolve_org_id", async { Ok::<_, OrgUsersError>(42) })
                .await
        );
        assert_eq!(value, 42);
        assert!(scope.remaining() <= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let scope = OperationScope::new(Duration::from_secs(5));
        let err = assert_err!(
            scope
                .run("fetch_users", async {
                    Err::<(), OrgUsersError>(
                        crate::error::DecodeError::new("fetch_users", "bad").into(),
                    )
                })
                .await
        );
        assert_eq!(err.kind(), "decode");
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_timeout() {
        let scope = OperationScope::new(Duration::from_millis(20));
        let err = scope
            .run("fetch_users", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<(), OrgUsersError>(())
            })
            .await
            .unwrap_err();

        match err {
            OrgUsersError::Connectivity(ConnectivityError::Timeout { operation, after }) => {
                assert_eq!(operation, "fetch_users");
                assert_eq!(after, Duration::from_millis(20));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_budget_is_shared_across_operations() {
        let scope = OperationScope::new(Duration::from_millis(300));

        assert_ok!(
            scope
                .run("connect", async {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok::<(), OrgUsersError>(())
                })
                .await
        );

        // 200ms of the 300ms budget are gone; another 200ms cannot fit.
        let err = scope
            .run("resolve_org_id", async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok::<(), OrgUsersError>(())
            })
            .await
            .unwrap_err();
        assert_eq!(err.operation(), Some("resolve_org_id"));
        assert_eq!(err.kind(), "connectivity");
    }

    #[tokio::test]
    async fn test_cancelled_scope() {
        let scope = OperationScope::new(Duration::from_secs(5));
        let token = scope.get_cancel_token();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let err = scope
            .run("resolve_org_id", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<(), OrgUsersError>(())
            })
            .await
            .unwrap_err();
        handle.await.unwrap();

        assert!(matches!(
            err,
            OrgUsersError::Connectivity(ConnectivityError::Cancelled { operation: "resolve_org_id" })
        ));
    }
}
