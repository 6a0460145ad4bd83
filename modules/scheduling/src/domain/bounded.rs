//! Deadline wrappers for collaborator calls.

use std::future::Future;
use std::time::Duration;

use tracing::error;

use crate::domain::error::DomainError;

/// Await `fut` for at most `limit`; elapsing becomes `DomainError::Timeout`.
pub async fn bounded<F>(
    operation: &'static str,
    limit: Duration,
    fut: F,
) -> Result<F::Output, DomainError>
where
    F: Future,
{
    tokio::time::timeout(limit, fut).await.map_err(|_| {
        let elapsed_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
        error!(operation, elapsed_ms, "collaborator call timed out");
        DomainError::timeout(operation, elapsed_ms)
    })
}

/// Bounded record-store call; failures are logged and become `Store`.
pub async fn store_call<T, F>(
    operation: &'static str,
    limit: Duration,
    fut: F,
) -> Result<T, DomainError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    bounded(operation, limit, fut).await?.map_err(|e| {
        error!(operation, error = %format!("{e:#}"), "record store call failed");
        DomainError::store(operation, format!("{e:#}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn elapsed_deadline_is_a_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            1
        };
        let err = bounded("slow_call", Duration::from_millis(50), slow)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Timeout {
                operation: "slow_call",
                elapsed_ms: 50
            }
        ));
        assert!(err.is_internal());
    }

    #[tokio::test]
    async fn store_failure_keeps_operation_name() {
        let failing = async { Err::<(), _>(anyhow::anyhow!("disk on fire")) };
        let err = store_call("find_by_id", Duration::from_secs(1), failing)
            .await
            .unwrap_err();
        match err {
            DomainError::Store { operation, message } => {
                assert_eq!(operation, "find_by_id");
                assert!(message.contains("disk on fire"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
