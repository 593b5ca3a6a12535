//! Caller-side control over a run: cancellation and deadline

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{Stage, StageError};

/// Cancellation token plus optional deadline for one pipeline run
///
/// Cancellation is observed before every model call and races any call in
/// flight. The deadline is checked between chain iterations only.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    cancellation_token: CancellationToken,
    deadline: Option<Instant>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing token (e.g. one wired to Ctrl-C)
    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail if cancelled or past the deadline
    pub fn check(&self, stage: Stage, steps_completed: u32) -> Result<(), StageError> {
        if self.is_cancelled() {
            debug!(%stage, %steps_completed, "RunControl::check: cancelled");
            return Err(StageError::Cancelled { stage, steps_completed });
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            debug!(%stage, %steps_completed, "RunControl::check: deadline passed");
            return Err(StageError::DeadlineExceeded { stage, steps_completed });
        }
        Ok(())
    }

    /// Drive `call` to completion unless cancellation wins the race
    ///
    /// A cancelled call is dropped mid-flight.
    pub async fn race<F, T>(&self, stage: Stage, steps_completed: u32, call: F) -> Result<T, StageError>
    where
        F: Future<Output = Result<T, StageError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancellation_token.cancelled() => {
                debug!(%stage, %steps_completed, "RunControl::race: cancelled in flight");
                Err(StageError::Cancelled { stage, steps_completed })
            }
            result = call => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_never_stops() {
        let control = RunControl::new();
        assert!(control.check(Stage::Orchestrate, 0).is_ok());
        assert!(control.deadline().is_none());
    }

    #[test]
    fn test_check_cancelled() {
        let control = RunControl::new();
        control.cancel();
        let err = control.check(Stage::Orchestrate, 3).unwrap_err();
        assert!(matches!(
            err,
            StageError::Cancelled {
                stage: Stage::Orchestrate,
                steps_completed: 3
            }
        ));
    }

    #[tokio::test]
    async fn test_check_deadline_passed() {
        let control = RunControl::new().with_deadline(Instant::now());
        let err = control.check(Stage::Orchestrate, 1).unwrap_err();
        assert!(matches!(err, StageError::DeadlineExceeded { steps_completed: 1, .. }));
    }

    #[tokio::test]
    async fn test_check_deadline_in_future() {
        let control = RunControl::new().with_timeout(Duration::from_secs(60));
        assert!(control.check(Stage::Orchestrate, 0).is_ok());
    }

    #[test]
    fn test_shared_token() {
        let token = CancellationToken::new();
        let control = RunControl::new().with_token(token.clone());
        token.cancel();
        assert!(control.is_cancelled());
    }

    #[tokio::test]
    async fn test_race_cancels_pending_call() {
        let control = RunControl::new();
        let canceller = control.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result: Result<(), StageError> = control
            .race(Stage::Synthesize, 0, std::future::pending::<Result<(), StageError>>())
            .await;
        assert!(matches!(result, Err(StageError::Cancelled { .. })));
    }

    #[tokio::test]
    async fn test_race_returns_call_result() {
        let control = RunControl::new();
        let result = control.race(Stage::Initiate, 0, async { Ok::<_, StageError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
