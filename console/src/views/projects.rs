use station_cache::{Observer, Snapshot};
use station_protocol::Project;
use station_protocol::operations::{DeleteProject, IdVariables, ListProjectsData};

use super::{EmptyState, ListContent, error_text, local_timestamp};
use crate::mutation::{self, DeleteOutcome};
use crate::{Console, ConfirmPrompt, ConsoleError, Route, Settings, keys, queries};

const DELETED: &str = "Project has been deleted!";
const DELETE_FAILED: &str = "Failed to delete project, please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn label(self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
        }
    }
}

/// One table row of the project list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub visibility: Visibility,
    /// Team name, or `N/A` for personal projects.
    pub team: String,
    pub subscription: Option<String>,
    pub created_at: Option<String>,
    /// Dashboard page of the project.
    pub link: String,
}

impl ProjectRow {
    pub fn new(project: &Project, settings: &Settings) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            description: project.description.clone().filter(|d| !d.is_empty()),
            visibility: if project.is_public {
                Visibility::Public
            } else {
                Visibility::Private
            },
            team: project.team_name().unwrap_or("N/A").to_string(),
            subscription: project.subscription_type.clone(),
            created_at: project.created_at.as_ref().map(local_timestamp),
            link: settings.project_url(&project.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListModel {
    pub title: &'static str,
    pub content: ListContent<ProjectRow>,
    /// A background refetch is running.
    pub refreshing: bool,
    /// Error of the last fetch; earlier rows are still shown.
    pub error: Option<String>,
}

impl ProjectListModel {
    fn new(snapshot: &Snapshot<ListProjectsData>, settings: &Settings) -> Self {
        let content = match snapshot.data() {
            None if snapshot.error.is_none() => ListContent::Loading,
            Some(data) if !data.projects.is_empty() => ListContent::Items(
                data.projects
                    .nodes()
                    .map(|project| ProjectRow::new(project, settings))
                    .collect(),
            ),
            _ => ListContent::Empty(EmptyState {
                title: Some("No projects available"),
                description: "A project is required to house services and environments.",
                action_label: "Create project",
                action: Route::NewProject,
            }),
        };
        Self {
            title: "Projects",
            content,
            refreshing: snapshot.fetching && snapshot.value.is_some(),
            error: error_text(snapshot),
        }
    }

    pub fn rows(&self) -> &[ProjectRow] {
        match &self.content {
            ListContent::Items(rows) => rows,
            ListContent::Loading | ListContent::Empty(_) => &[],
        }
    }
}

/// The project table, reading `["projects"]`.
#[derive(Debug)]
pub struct ProjectListView {
    console: Console,
    observer: Observer<ListProjectsData>,
}

impl ProjectListView {
    /// Mount the view. `initial` is a server-computed snapshot; when given,
    /// the first render issues no request.
    pub fn mount(console: &Console, initial: Option<ListProjectsData>) -> Result<Self, ConsoleError> {
        if let Some(data) = initial {
            console.cache().hydrate(&keys::projects(), data);
        }
        let observer = console.cache().observe(&keys::projects());
        queries::projects(console)?;
        Ok(Self {
            console: console.clone(),
            observer,
        })
    }

    /// Current model. Revalidates in the background when stale.
    pub fn render(&self) -> Result<ProjectListModel, ConsoleError> {
        let snapshot = queries::projects(&self.console)?;
        Ok(ProjectListModel::new(&snapshot, self.console.settings()))
    }

    /// Wait for any running fetch, then render.
    pub async fn settled(&mut self) -> Result<ProjectListModel, ConsoleError> {
        let snapshot = self.observer.settled().await?;
        Ok(ProjectListModel::new(&snapshot, self.console.settings()))
    }

    /// Wait for the next change of `["projects"]`, then render.
    pub async fn changed(&mut self) -> Result<ProjectListModel, ConsoleError> {
        let snapshot = self.observer.changed().await?;
        Ok(ProjectListModel::new(&snapshot, self.console.settings()))
    }

    fn project_name(&self, id: &str) -> Option<String> {
        let snapshot = self.observer.snapshot().ok()?;
        snapshot
            .data()?
            .projects
            .nodes()
            .find(|project| project.id == id)
            .map(|project| project.name.clone())
    }

    /// Confirm, delete, and on success invalidate `["projects"]`.
    pub async fn delete(&self, project_id: &str) -> DeleteOutcome {
        let name = self
            .project_name(project_id)
            .unwrap_or_else(|| project_id.to_string());
        let client = self.console.client().clone();
        let variables = IdVariables::new(project_id);

        mutation::confirmed_delete(
            &self.console,
            ConfirmPrompt::delete_project(&name),
            keys::projects(),
            DELETED,
            DELETE_FAILED,
            || async move {
                client
                    .request::<DeleteProject>(&variables)
                    .await
                    .map(|data| data.project_delete)
            },
        )
        .await
    }
}
