use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::{Form, FormValues, SubmitOutcome, SubmitRejected};

/// Errors a submit handler can report back onto the form.
pub trait FormFeedback {
    /// Messages to show inline, one per entry.
    fn form_messages(&self) -> Vec<String>;
}

#[derive(Debug, Error)]
pub enum SubmitError<E> {
    #[error(transparent)]
    Rejected(#[from] SubmitRejected),

    #[error(transparent)]
    Failed(E),
}

/// A [`Form`] shared between a view and its submit task.
#[derive(Debug, Clone)]
pub struct FormHandle {
    inner: Arc<Mutex<Form>>,
}

impl FormHandle {
    pub fn new(form: Form) -> Self {
        Self {
            inner: Arc::new(Mutex::new(form)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Form> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one submission: validate and enter `Submitting`, await `handler`
    /// with the values (without holding the lock), then return to `Idle`
    /// recording the outcome.
    ///
    /// Dropping the returned future mid-flight returns the form to `Idle`
    /// and discards the result.
    pub async fn submit<T, E, F, Fut>(&self, handler: F) -> Result<T, SubmitError<E>>
    where
        F: FnOnce(FormValues) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: FormFeedback,
    {
        let values = self.lock().begin_submit()?;
        let pending = PendingSubmit { handle: Some(self) };
        let result = handler(values).await;
        pending.disarm();

        let outcome = match &result {
            Ok(_) => SubmitOutcome::Succeeded,
            Err(error) => SubmitOutcome::Failed {
                messages: error.form_messages(),
            },
        };
        self.lock().finish_submit(outcome);
        result.map_err(SubmitError::Failed)
    }
}

/// Abandons the submission unless disarmed before drop.
struct PendingSubmit<'a> {
    handle: Option<&'a FormHandle>,
}

impl PendingSubmit<'_> {
    fn disarm(mut self) {
        self.handle = None;
    }
}

impl Drop for PendingSubmit<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.lock().abandon_submit();
        }
    }
}
