//! Per-call deadline and cancellation for store round trips.

use std::future::Future;
use std::time::Duration;

use common::metrics::{record_store_operation, OperationStatus};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::{StorageError, StoreError};

/// Caller-supplied limits for a single repository call
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancellation: Option<Cancellation>,
}

impl CallContext {
    /// No deadline and no cancellation
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::default().deadline(Instant::now() + timeout)
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    /// Drive one store round trip, aborting it when the deadline passes or
    /// the caller cancels.
    pub async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let started = std::time::Instant::now();

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        let cancelled = async {
            match &self.cancellation {
                Some(cancellation) => cancellation.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };

        let (result, status) = tokio::select! {
            result = call => match result {
                Ok(value) => (Ok(value), OperationStatus::Success),
                Err(source) => (Err(StorageError::store(operation, source)), OperationStatus::Error),
            },
            _ = deadline => {
                tracing::warn!(operation, "Store call timed out");
                (Err(StorageError::Timeout { operation }), OperationStatus::Timeout)
            }
            _ = cancelled => {
                tracing::debug!(operation, "Store call cancelled");
                (Err(StorageError::Cancelled { operation }), OperationStatus::Cancelled)
            }
        };

        record_store_operation(operation, status, started.elapsed().as_secs_f64());
        result
    }
}

/// Receiving side of a cancellation signal
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

/// Triggers every [`Cancellation`] created alongside it
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Create a linked cancel handle and cancellation token
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, Cancellation { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Cancellation {
    /// Resolves once cancelled. Never resolves if the handle was dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let ctx = CallContext::with_timeout(Duration::from_secs(1));
        let result = ctx.run("test.fast", async { Ok::<_, StoreError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_deadline_aborts_slow_call() {
        let ctx = CallContext::with_timeout(Duration::from_millis(20));
        let result = ctx
            .run("test.slow", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, StoreError>(())
            })
            .await;

        assert!(matches!(
            result,
            Err(StorageError::Timeout { operation: "test.slow" })
        ));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_call() {
        let (handle, token) = cancellation();
        let ctx = CallContext::background().cancellation(token);

        let call = tokio::spawn(async move {
            ctx.run("test.cancelled", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, StoreError>(())
            })
            .await
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();

        let result = call.await.unwrap();
        assert!(matches!(result, Err(StorageError::Cancelled { .. })));
    }

    #[tokio::test]
    async fn test_store_error_is_annotated() {
        let ctx = CallContext::background();
        let result = ctx
            .run("test.dup", async {
                Err::<(), _>(StoreError::DuplicateKey("x".to_string()))
            })
            .await;
        assert!(matches!(result, Err(StorageError::Duplicate { operation: "test.dup", .. })));
    }
}
