use station_cache::{Observer, Snapshot};
use station_protocol::operations::{
    DeleteService, IdVariables, ListProjectsData, ReadProjectData,
};

use super::{EmptyState, SelectorModel, error_text};
use crate::mutation::{self, DeleteOutcome};
use crate::{Console, ConfirmPrompt, ConsoleError, Route, keys, queries};

const DELETED: &str = "Service has been deleted!";
const DELETE_FAILED: &str = "Failed to delete service, please try again later.";
const SELECT_PROMPT: &str = "Select a project to view all services within it.";

/// One card of the service grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCard {
    pub id: String,
    /// Service name, or its id when unnamed.
    pub label: String,
    pub icon: Option<String>,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceListContent {
    NoSelection { prompt: &'static str },
    Loading,
    Empty(EmptyState),
    Cards(Vec<ServiceCard>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceListModel {
    pub title: &'static str,
    pub selector: SelectorModel,
    pub content: ServiceListContent,
    pub refreshing: bool,
    pub error: Option<String>,
}

impl ServiceListModel {
    fn new(
        projects: &Snapshot<ListProjectsData>,
        selected: Option<&str>,
        project: Option<&Snapshot<ReadProjectData>>,
    ) -> Self {
        let selector = SelectorModel::new(projects, selected);
        let (content, refreshing, error) = match (selected, project) {
            (Some(project_id), Some(snapshot)) => (
                Self::content(project_id, snapshot),
                snapshot.fetching && snapshot.value.is_some(),
                error_text(snapshot),
            ),
            _ => (
                ServiceListContent::NoSelection {
                    prompt: SELECT_PROMPT,
                },
                false,
                error_text(projects),
            ),
        };
        Self {
            title: "Services",
            selector,
            content,
            refreshing,
            error,
        }
    }

    fn content(project_id: &str, snapshot: &Snapshot<ReadProjectData>) -> ServiceListContent {
        match snapshot.data() {
            None if snapshot.error.is_none() => ServiceListContent::Loading,
            Some(data) if !data.project.services.is_empty() => ServiceListContent::Cards(
                data.project
                    .services
                    .nodes()
                    .map(|service| ServiceCard {
                        id: service.id.clone(),
                        label: service.label().to_string(),
                        icon: service.icon.clone(),
                        link: format!("/project/{project_id}/service/{}", service.id),
                    })
                    .collect(),
            ),
            _ => ServiceListContent::Empty(EmptyState {
                title: Some("No services available"),
                description: "Spin up a new web application, database, and more to get started!",
                action_label: "Create service",
                action: Route::NewService,
            }),
        }
    }

    pub fn cards(&self) -> &[ServiceCard] {
        match &self.content {
            ServiceListContent::Cards(cards) => cards,
            _ => &[],
        }
    }
}

/// Service grid of the selected project, reading `["projects"]` for the
/// picker and `["project", id]` for the cards.
#[derive(Debug)]
pub struct ServiceListView {
    console: Console,
    selected: Option<String>,
    projects: Observer<ListProjectsData>,
    project: Option<Observer<ReadProjectData>>,
}

impl ServiceListView {
    /// Mount with the project selected by the route, if any. Initial data
    /// hydrates the matching keys.
    pub fn mount(
        console: &Console,
        project_id: Option<String>,
        initial_projects: Option<ListProjectsData>,
        initial_project: Option<ReadProjectData>,
    ) -> Result<Self, ConsoleError> {
        if let Some(data) = initial_projects {
            console.cache().hydrate(&keys::projects(), data);
        }
        if let (Some(id), Some(data)) = (&project_id, initial_project)
            && data.project.id == *id
        {
            console.cache().hydrate(&keys::project(id), data);
        }

        let projects = console.cache().observe(&keys::projects());
        queries::projects(console)?;

        let mut view = Self {
            console: console.clone(),
            selected: None,
            projects,
            project: None,
        };
        view.watch(project_id)?;
        Ok(view)
    }

    fn watch(&mut self, project_id: Option<String>) -> Result<(), ConsoleError> {
        self.project = match &project_id {
            Some(id) => {
                let observer = self.console.cache().observe(&keys::project(id));
                queries::project(&self.console, id)?;
                Some(observer)
            }
            None => None,
        };
        self.selected = project_id;
        Ok(())
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Switch projects and reflect the choice in the route.
    pub fn select_project(&mut self, project_id: Option<String>) -> Result<(), ConsoleError> {
        self.watch(project_id.clone())?;
        self.console
            .navigator()
            .navigate(Route::Services { project_id });
        Ok(())
    }

    pub fn render(&self) -> Result<ServiceListModel, ConsoleError> {
        let projects = queries::projects(&self.console)?;
        let project = self
            .selected
            .as_deref()
            .map(|id| queries::project(&self.console, id))
            .transpose()?;
        Ok(ServiceListModel::new(
            &projects,
            self.selected.as_deref(),
            project.as_ref(),
        ))
    }

    /// Wait for running fetches of both keys, then render.
    pub async fn settled(&mut self) -> Result<ServiceListModel, ConsoleError> {
        let projects = self.projects.settled().await?;
        let project = match self.project.as_mut() {
            Some(observer) => Some(observer.settled().await?),
            None => None,
        };
        Ok(ServiceListModel::new(
            &projects,
            self.selected.as_deref(),
            project.as_ref(),
        ))
    }

    fn service_label(&self, service_id: &str) -> Option<String> {
        let snapshot = self.project.as_ref()?.snapshot().ok()?;
        snapshot
            .data()?
            .project
            .services
            .nodes()
            .find(|service| service.id == service_id)
            .map(|service| service.label().to_string())
    }

    /// Confirm, delete, and on success invalidate `["project", id]`.
    pub async fn delete(&self, service_id: &str) -> DeleteOutcome {
        let Some(project_id) = self.selected.clone() else {
            return DeleteOutcome::Failed {
                message: SELECT_PROMPT.to_string(),
            };
        };
        let label = self
            .service_label(service_id)
            .unwrap_or_else(|| service_id.to_string());
        let client = self.console.client().clone();
        let variables = IdVariables::new(service_id);

        mutation::confirmed_delete(
            &self.console,
            ConfirmPrompt::delete_service(&label),
            keys::project(&project_id),
            DELETED,
            DELETE_FAILED,
            || async move {
                client
                    .request::<DeleteService>(&variables)
                    .await
                    .map(|data| data.service_delete)
            },
        )
        .await
    }
}
