use station_cache::CacheError;
use station_client::ClientError;
use station_form::{FormError, FormFeedback, SubmitError, SubmitRejected};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The form did not pass validation; nothing was sent.
    #[error(transparent)]
    Rejected(#[from] SubmitRejected),

    #[error(transparent)]
    Form(#[from] FormError),
}

impl ConsoleError {
    /// The transport error behind this one, looking through cache fetches.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client(error) => Some(error),
            Self::Cache(error) => error.fetch_error()?.downcast_ref::<ClientError>(),
            Self::Rejected(_) | Self::Form(_) => None,
        }
    }

    /// Messages of the GraphQL errors the server returned, if any.
    pub fn graphql_messages(&self) -> Vec<String> {
        self.client_error()
            .and_then(ClientError::graphql_errors)
            .map(|errors| errors.iter().map(|e| e.message.clone()).collect())
            .unwrap_or_default()
    }
}

impl FormFeedback for ConsoleError {
    fn form_messages(&self) -> Vec<String> {
        self.graphql_messages()
    }
}

impl From<SubmitError<ConsoleError>> for ConsoleError {
    fn from(error: SubmitError<ConsoleError>) -> Self {
        match error {
            SubmitError::Rejected(rejected) => Self::Rejected(rejected),
            SubmitError::Failed(error) => error,
        }
    }
}
