use station_form::validate;
use station_form::{FieldSpec, Form, FormHandle, FormValues};
use station_protocol::operations::{
    CreateProject, CreatedProject, InputVariables, ProjectCreateInput,
};

use super::SelectOption;
use crate::{Console, ConsoleError, Notification, Route, keys};

/// Environments a new project can start with, as `(value, label)`.
pub const ENVIRONMENTS: [(&str, &str); 3] = [
    ("production", "Production"),
    ("staging", "Staging"),
    ("development", "Development"),
];

const CREATE_FAILED: &str = "Failed to create project, please try again later.";

fn project_form() -> Form {
    Form::new(vec![
        FieldSpec::text("name", "").validate(validate::trimmed_non_empty("Name is required")),
        FieldSpec::text("description", ""),
        FieldSpec::text("environment", "production").validate(validate::one_of(
            ENVIRONMENTS.iter().map(|(value, _)| *value),
            "Select a known environment",
        )),
        FieldSpec::flag("private", false),
    ])
}

fn project_input(values: &FormValues) -> ProjectCreateInput {
    let description = values.text("description").trim();
    ProjectCreateInput {
        name: values.text("name").trim().to_string(),
        description: (!description.is_empty()).then(|| description.to_string()),
        default_environment_name: Some(values.text("environment").to_string()),
        is_public: Some(!values.flag("private")),
    }
}

/// The "Create project" form.
#[derive(Debug)]
pub struct CreateProjectView {
    console: Console,
    form: FormHandle,
}

impl CreateProjectView {
    pub fn new(console: &Console) -> Self {
        Self {
            console: console.clone(),
            form: FormHandle::new(project_form()),
        }
    }

    pub fn form(&self) -> &FormHandle {
        &self.form
    }

    pub fn environment_options(&self) -> Vec<SelectOption> {
        ENVIRONMENTS
            .iter()
            .map(|(value, label)| SelectOption {
                value: value.to_string(),
                label: label.to_string(),
            })
            .collect()
    }

    /// Validate and send `CreateProject`.
    ///
    /// On success: a notification, invalidation of `["projects"]`, and a
    /// deferred redirect to the project list. GraphQL errors land on the
    /// form; other failures raise a generic notification.
    pub async fn submit(&self) -> Result<CreatedProject, ConsoleError> {
        let client = self.console.client().clone();
        let result = self
            .form
            .submit(|values| async move {
                let variables = InputVariables {
                    input: project_input(&values),
                };
                client
                    .request::<CreateProject>(&variables)
                    .await
                    .map(|data| data.project_create)
                    .map_err(ConsoleError::from)
            })
            .await
            .map_err(ConsoleError::from);

        match result {
            Ok(project) => {
                self.console.notifications().show(Notification::success(format!(
                    "Project {} has been created! Will redirect in 3 seconds.",
                    project.name
                )));
                self.console.cache().invalidate(&keys::projects());
                self.console
                    .navigator()
                    .navigate_after(Route::Projects, self.console.settings().redirect_delay);
                Ok(project)
            }
            Err(error) => {
                if matches!(error, ConsoleError::Client(_)) && error.graphql_messages().is_empty() {
                    self.console
                        .notifications()
                        .show(Notification::error(CREATE_FAILED));
                }
                Err(error)
            }
        }
    }
}
