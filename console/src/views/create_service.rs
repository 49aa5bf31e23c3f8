use station_cache::Observer;
use station_form::validate;
use station_form::{FieldSpec, Form, FormHandle, FormValues};
use station_protocol::operations::{
    CreateService, CreatedService, InputVariables, ListProjectsData, ReadProjectData,
    ServiceCreateInput, ServiceSourceInput,
};

use super::{SelectOption, SelectorModel};
use crate::{Console, ConsoleError, Notification, Route, keys, queries};

/// An entry of the service type picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceTypeOption {
    pub value: &'static str,
    pub label: &'static str,
    /// Listed for discoverability but not selectable yet.
    pub disabled: bool,
}

pub const SERVICE_TYPES: [ServiceTypeOption; 5] = [
    ServiceTypeOption {
        value: "repo",
        label: "GitHub repository",
        disabled: false,
    },
    ServiceTypeOption {
        value: "template",
        label: "Template",
        disabled: true,
    },
    ServiceTypeOption {
        value: "database",
        label: "Database",
        disabled: true,
    },
    ServiceTypeOption {
        value: "docker",
        label: "Docker image",
        disabled: false,
    },
    ServiceTypeOption {
        value: "empty",
        label: "Empty",
        disabled: false,
    },
];

const CREATE_FAILED: &str = "Failed to create service, please try again later.";

fn service_form() -> Form {
    let selectable = SERVICE_TYPES
        .iter()
        .filter(|option| !option.disabled)
        .map(|option| option.value);

    Form::new(vec![
        FieldSpec::text("projectId", "").validate(validate::non_empty("Select a project")),
        FieldSpec::text("name", "").validate(validate::non_empty("Name is required")),
        FieldSpec::text("environmentId", ""),
        FieldSpec::text("type", "empty")
            .validate(validate::one_of(selectable, "This service type is not available yet")),
        FieldSpec::text("repoUrl", "")
            .validate(validate::url("Enter the repository URL"))
            .enabled_when(|values| values.text("type") == "repo"),
        FieldSpec::text("repoBranch", "master")
            .validate(validate::non_empty("Branch is required"))
            .enabled_when(|values| values.text("type") == "repo"),
        FieldSpec::text("dockerImage", "")
            .validate(validate::non_empty("Image is required"))
            .enabled_when(|values| values.text("type") == "docker"),
    ])
}

fn service_input(values: &FormValues) -> ServiceCreateInput {
    let kind = values.text("type");
    let environment_id = values.text("environmentId");
    ServiceCreateInput {
        project_id: values.text("projectId").to_string(),
        environment_id: (!environment_id.is_empty()).then(|| environment_id.to_string()),
        name: Some(values.text("name").to_string()),
        branch: (kind == "repo").then(|| values.text("repoBranch").to_string()),
        source: match kind {
            "repo" => Some(ServiceSourceInput::repo(values.text("repoUrl"))),
            "docker" => Some(ServiceSourceInput::image(values.text("dockerImage"))),
            _ => None,
        },
    }
}

/// The "Spin up service" form.
#[derive(Debug)]
pub struct CreateServiceView {
    console: Console,
    form: FormHandle,
    projects: Observer<ListProjectsData>,
    project: Option<Observer<ReadProjectData>>,
}

impl CreateServiceView {
    /// Mount the form. `initial_projects` seeds the project picker.
    pub fn mount(
        console: &Console,
        initial_projects: Option<ListProjectsData>,
    ) -> Result<Self, ConsoleError> {
        if let Some(data) = initial_projects {
            console.cache().hydrate(&keys::projects(), data);
        }
        let projects = console.cache().observe(&keys::projects());
        queries::projects(console)?;
        Ok(Self {
            console: console.clone(),
            form: FormHandle::new(service_form()),
            projects,
            project: None,
        })
    }

    pub fn form(&self) -> &FormHandle {
        &self.form
    }

    pub fn service_types(&self) -> &'static [ServiceTypeOption] {
        &SERVICE_TYPES
    }

    /// Pick the project; starts loading its environments. Clears a
    /// previously chosen environment when the project changes.
    pub fn select_project(&mut self, project_id: &str) -> Result<(), ConsoleError> {
        let changed = {
            let mut form = self.form.lock();
            let changed = form.values().text("projectId") != project_id;
            form.set_field("projectId", project_id)?;
            if changed {
                form.set_field("environmentId", "")?;
            }
            changed
        };
        if changed || self.project.is_none() {
            self.project = if project_id.is_empty() {
                None
            } else {
                let observer = self.console.cache().observe(&keys::project(project_id));
                queries::project(&self.console, project_id)?;
                Some(observer)
            };
        }
        Ok(())
    }

    pub fn project_options(&self) -> Result<SelectorModel, ConsoleError> {
        let snapshot = queries::projects(&self.console)?;
        let selected = self.form.lock().values().text("projectId").to_string();
        Ok(SelectorModel::new(
            &snapshot,
            (!selected.is_empty()).then_some(selected.as_str()),
        ))
    }

    /// Environments of the selected project; empty until one is chosen and
    /// loaded.
    pub fn environment_options(&self) -> Result<Vec<SelectOption>, ConsoleError> {
        let project_id = self.form.lock().values().text("projectId").to_string();
        if project_id.is_empty() {
            return Ok(Vec::new());
        }
        let snapshot = queries::project(&self.console, &project_id)?;
        Ok(snapshot
            .data()
            .map(|data| {
                data.project
                    .environments
                    .nodes()
                    .map(|environment| SelectOption {
                        value: environment.id.clone(),
                        label: environment.name.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Wait until the selected project's environments are loaded.
    pub async fn environments_settled(&mut self) -> Result<Vec<SelectOption>, ConsoleError> {
        self.projects.settled().await?;
        if let Some(observer) = self.project.as_mut() {
            observer.settled().await?;
        }
        self.environment_options()
    }

    /// Validate and send `CreateService`.
    ///
    /// On success: a notification, invalidation of the project's key, and a
    /// deferred redirect to its service list.
    pub async fn submit(&self) -> Result<CreatedService, ConsoleError> {
        let client = self.console.client().clone();
        let result = self
            .form
            .submit(|values| async move {
                let variables = InputVariables {
                    input: service_input(&values),
                };
                client
                    .request::<CreateService>(&variables)
                    .await
                    .map(|data| data.service_create)
                    .map_err(ConsoleError::from)
            })
            .await
            .map_err(ConsoleError::from);

        match result {
            Ok(service) => {
                self.console.notifications().show(Notification::success(format!(
                    "Service {} has been created! Will redirect in 3 seconds.",
                    service.name
                )));
                self.console
                    .cache()
                    .invalidate(&keys::project(&service.project_id));
                self.console.navigator().navigate_after(
                    Route::Services {
                        project_id: Some(service.project_id.clone()),
                    },
                    self.console.settings().redirect_delay,
                );
                Ok(service)
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
