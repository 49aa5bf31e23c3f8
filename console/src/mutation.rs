use std::future::Future;

use station_cache::QueryKey;
use station_client::ClientError;

use crate::{Console, ConfirmPrompt, Notification};

/// Result of a confirmed delete action. Every branch has already been
/// reported through notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined; no request was sent.
    Cancelled,
    Deleted,
    Failed { message: String },
}

/// Text for a failed mutation: the server's own messages when it sent
/// GraphQL errors, `fallback` for transport failures.
pub(crate) fn failure_message(error: &ClientError, fallback: &str) -> String {
    match error.graphql_errors() {
        Some(errors) if !errors.is_empty() => errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; "),
        _ => fallback.to_string(),
    }
}

/// Confirm, run `mutation`, then invalidate `key` on success. Shared by the
/// project and service delete actions.
pub(crate) async fn confirmed_delete<F, Fut>(
    console: &Console,
    prompt: ConfirmPrompt,
    key: QueryKey,
    success: &str,
    fallback: &str,
    mutation: F,
) -> DeleteOutcome
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<bool, ClientError>>,
{
    if !console.confirm(&prompt).await {
        tracing::debug!(title = %prompt.title, "delete cancelled");
        return DeleteOutcome::Cancelled;
    }

    let message = match mutation().await {
        Ok(true) => {
            console.cache().invalidate(&key);
            console.notifications().show(Notification::success(success));
            return DeleteOutcome::Deleted;
        }
        // The API answered `false` without an error.
        Ok(false) => fallback.to_string(),
        Err(error) => {
            tracing::warn!("delete failed: {error}");
            failure_message(&error, fallback)
        }
    };

    console
        .notifications()
        .show(Notification::error(message.clone()));
    DeleteOutcome::Failed { message }
}
