//! Mutation gate: one provisioning call in flight per orchestrator

use credbridge_client::{ClientError, RequestContext};
use tokio::sync::{Mutex, MutexGuard};

/// Async lock held for the whole of a provisioning call
///
/// Waiting for the gate honours the caller's cancellation token and
/// deadline, so a queued call can be abandoned without ever reaching the
/// network.
#[derive(Debug, Default)]
pub struct MutationGate {
    lock: Mutex<()>,
}

/// Proof of holding the gate; released on drop
#[derive(Debug)]
pub struct GatePermit<'a> {
    _guard: MutexGuard<'a, ()>,
}

impl MutationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, ctx: &RequestContext) -> Result<GatePermit<'_>, ClientError> {
        ctx.run(async {
            Ok(GatePermit {
                _guard: self.lock.lock().await,
            })
        })
        .await
    }

    /// Whether a mutation currently holds the gate
    pub fn is_held(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_permit_releases_on_drop() {
        let gate = MutationGate::new();
        let ctx = RequestContext::new();

        let permit = gate.acquire(&ctx).await.unwrap();
        assert!(gate.is_held());
        drop(permit);
        assert!(!gate.is_held());
    }

    #[tokio::test]
    async fn test_waiting_caller_can_be_cancelled() {
        let gate = MutationGate::new();
        let _held = gate.acquire(&RequestContext::new()).await.unwrap();

        let token = CancellationToken::new();
        let waiter = RequestContext::with_cancellation(token.clone());
        token.cancel();

        assert!(matches!(
            gate.acquire(&waiter).await,
            Err(ClientError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_waiting_caller_hits_deadline() {
        let gate = MutationGate::new();
        let _held = gate.acquire(&RequestContext::new()).await.unwrap();

        let waiter = RequestContext::new().with_timeout(Duration::from_millis(20));
        assert!(matches!(
            gate.acquire(&waiter).await,
            Err(ClientError::DeadlineExceeded)
        ));
    }
}
