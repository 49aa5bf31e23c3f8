use async_trait::async_trait;

/// Contents of a confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

impl ConfirmPrompt {
    pub fn delete_project(name: &str) -> Self {
        Self {
            title: "Delete project?".to_string(),
            message: format!(
                "Are you sure you want to delete project {name}? This will delete all \
                 environments and services associated with it."
            ),
            confirm_label: "Delete".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }

    pub fn delete_service(name: &str) -> Self {
        Self {
            title: "Delete service?".to_string(),
            message: format!(
                "Are you sure you want to delete service {name}? Its deployments will be \
                 removed from every environment."
            ),
            confirm_label: "Delete".to_string(),
            cancel_label: "Cancel".to_string(),
        }
    }
}

/// Asks the user to confirm a destructive action.
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool;
}

/// Answers every prompt the same way, for `--yes` and tests.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        tracing::debug!(title = %prompt.title, answer = self.0, "auto-answered confirmation");
        self.0
    }
}
