//! In-flight registration request.

use futures_util::future::FutureExt;
use tokio::task::{JoinError, JoinHandle};

use signup_providers::{RegistrationClient, RegistrationReceipt, SubmitError};
use signup_types::FormValues;

pub(crate) type SubmitResult = Result<RegistrationReceipt, SubmitError>;

/// A spawned registration POST. Existence means a submit is in flight.
#[derive(Debug)]
pub(crate) struct SubmissionTask {
    handle: JoinHandle<SubmitResult>,
}

impl SubmissionTask {
    /// Spawn the request with a snapshot of `values`.
    pub(crate) fn spawn(client: RegistrationClient, values: FormValues) -> Self {
        let handle = tokio::spawn(async move { client.register(&values).await });
        Self { handle }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Take the result without blocking, or give the task back.
    pub(crate) fn try_complete_now(mut self) -> Result<Result<SubmitResult, JoinError>, Self> {
        match (&mut self.handle).now_or_never() {
            Some(result) => Ok(result),
            None => Err(self),
        }
    }
}

impl Drop for SubmissionTask {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            self.handle.abort();
        }
    }
}
