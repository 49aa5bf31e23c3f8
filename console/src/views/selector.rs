use station_cache::{Observer, Snapshot};
use station_protocol::operations::ListProjectsData;

use crate::{Console, ConsoleError, Route, keys, queries};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Project picker: a select when projects exist, otherwise a prompt to
/// create one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorModel {
    Loading,
    Options {
        selected: Option<String>,
        options: Vec<SelectOption>,
    },
    CreateProject {
        label: &'static str,
        route: Route,
    },
}

impl SelectorModel {
    pub fn new(snapshot: &Snapshot<ListProjectsData>, selected: Option<&str>) -> Self {
        match snapshot.data() {
            None if snapshot.is_loading() => Self::Loading,
            Some(data) if !data.projects.is_empty() => Self::Options {
                selected: selected.map(str::to_string),
                options: data
                    .projects
                    .nodes()
                    .map(|project| SelectOption {
                        value: project.id.clone(),
                        label: project.name.clone(),
                    })
                    .collect(),
            },
            _ => Self::CreateProject {
                label: "Create a project",
                route: Route::NewProject,
            },
        }
    }

    pub fn options(&self) -> &[SelectOption] {
        match self {
            Self::Options { options, .. } => options,
            Self::Loading | Self::CreateProject { .. } => &[],
        }
    }
}

/// Standalone project picker reading `["projects"]`.
#[derive(Debug)]
pub struct ProjectSelector {
    console: Console,
    observer: Observer<ListProjectsData>,
}

impl ProjectSelector {
    pub fn mount(console: &Console) -> Result<Self, ConsoleError> {
        let observer = console.cache().observe(&keys::projects());
        queries::projects(console)?;
        Ok(Self {
            console: console.clone(),
            observer,
        })
    }

    pub fn render(&self, selected: Option<&str>) -> Result<SelectorModel, ConsoleError> {
        let snapshot = queries::projects(&self.console)?;
        Ok(SelectorModel::new(&snapshot, selected))
    }

    pub async fn settled(&mut self, selected: Option<&str>) -> Result<SelectorModel, ConsoleError> {
        let snapshot = self.observer.settled().await?;
        Ok(SelectorModel::new(&snapshot, selected))
    }
}
