//! The named documents issued by the console.
//!
//! | name | kind | data |
//! |---|---|---|
//! | `ListProjects` | query | `projects` connection |
//! | `ReadProject` | query | `project` with environments and services |
//! | `CreateProject` | mutation | `projectCreate { id name }` |
//! | `DeleteProject` | mutation | `projectDelete: Boolean` |
//! | `CreateService` | mutation | `serviceCreate { id name projectId }` |
//! | `DeleteService` | mutation | `serviceDelete: Boolean` |

use serde::{Deserialize, Serialize};

use crate::envelope::{Operation, OperationKind};
use crate::model::{Project, ProjectDetail};
use crate::pagination::Connection;

/// Variables for documents that take a single `$id: String!`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdVariables {
    pub id: String,
}

impl IdVariables {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ListProjects
// ─────────────────────────────────────────────────────────────────────────────

pub struct ListProjects;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListProjectsVariables {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListProjectsData {
    pub projects: Connection<Project>,
}

impl Operation for ListProjects {
    const NAME: &'static str = "ListProjects";
    const KIND: OperationKind = OperationKind::Query;
    const DOCUMENT: &'static str = r#"query ListProjects($first: Int, $after: String) {
	projects(first: $first, after: $after) {
		edges {
			cursor
			node {
				createdAt
				deletedAt
				description
				id
				isPublic
				isTempProject
				name
				subscriptionPlanLimit
				subscriptionType
				team {
					id
					name
				}
				teamId
			}
		}
		pageInfo {
			endCursor
			startCursor
			hasNextPage
			hasPreviousPage
		}
	}
}"#;

    type Variables = ListProjectsVariables;
    type Data = ListProjectsData;
}

// ─────────────────────────────────────────────────────────────────────────────
// ReadProject
// ─────────────────────────────────────────────────────────────────────────────

pub struct ReadProject;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadProjectData {
    pub project: ProjectDetail,
}

impl Operation for ReadProject {
    const NAME: &'static str = "ReadProject";
    const KIND: OperationKind = OperationKind::Query;
    const DOCUMENT: &'static str = r#"query ReadProject($id: String!) {
	project(id: $id) {
		id
		name
		environments {
			edges {
				cursor
				node {
					id
					name
				}
			}
			pageInfo {
				endCursor
				startCursor
				hasNextPage
				hasPreviousPage
			}
		}
		services {
			edges {
				cursor
				node {
					createdAt
					icon
					id
					name
				}
			}
			pageInfo {
				endCursor
				startCursor
				hasNextPage
				hasPreviousPage
			}
		}
	}
}"#;

    type Variables = IdVariables;
    type Data = ReadProjectData;
}

// ─────────────────────────────────────────────────────────────────────────────
// CreateProject
// ─────────────────────────────────────────────────────────────────────────────

pub struct CreateProject;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreateInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_environment_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputVariables<T> {
    pub input: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedProject {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectData {
    pub project_create: CreatedProject,
}

impl Operation for CreateProject {
    const NAME: &'static str = "CreateProject";
    const KIND: OperationKind = OperationKind::Mutation;
    const DOCUMENT: &'static str = r#"mutation CreateProject($input: ProjectCreateInput!) {
	projectCreate(input: $input) {
		id
		name
	}
}"#;

    type Variables = InputVariables<ProjectCreateInput>;
    type Data = CreateProjectData;
}

// ─────────────────────────────────────────────────────────────────────────────
// DeleteProject
// ─────────────────────────────────────────────────────────────────────────────

pub struct DeleteProject;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteProjectData {
    pub project_delete: bool,
}

impl Operation for DeleteProject {
    const NAME: &'static str = "DeleteProject";
    const KIND: OperationKind = OperationKind::Mutation;
    const DOCUMENT: &'static str = r#"mutation DeleteProject($id: String!) {
	projectDelete(id: $id)
}"#;

    type Variables = IdVariables;
    type Data = DeleteProjectData;
}

// ─────────────────────────────────────────────────────────────────────────────
// CreateService
// ─────────────────────────────────────────────────────────────────────────────

pub struct CreateService;

/// Where a service is built from. Exactly one of the fields is set; an empty
/// service has no source at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSourceInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ServiceSourceInput {
    pub fn repo(url: impl Into<String>) -> Self {
        Self {
            repo: Some(url.into()),
            image: None,
        }
    }

    pub fn image(name: impl Into<String>) -> Self {
        Self {
            repo: None,
            image: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCreateInput {
    pub project_id: String,
    /// When the environment is a fork the service is created only there,
    /// otherwise in every non-fork environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ServiceSourceInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedService {
    pub id: String,
    pub name: String,
    pub project_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceData {
    pub service_create: CreatedService,
}

impl Operation for CreateService {
    const NAME: &'static str = "CreateService";
    const KIND: OperationKind = OperationKind::Mutation;
    const DOCUMENT: &'static str = r#"mutation CreateService($input: ServiceCreateInput!) {
	serviceCreate(input: $input) {
		id
		name
		projectId
	}
}"#;

    type Variables = InputVariables<ServiceCreateInput>;
    type Data = CreateServiceData;
}

// ─────────────────────────────────────────────────────────────────────────────
// DeleteService
// ─────────────────────────────────────────────────────────────────────────────

pub struct DeleteService;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteServiceData {
    pub service_delete: bool,
}

impl Operation for DeleteService {
    const NAME: &'static str = "DeleteService";
    const KIND: OperationKind = OperationKind::Mutation;
    const DOCUMENT: &'static str = r#"mutation DeleteService($id: String!) {
	serviceDelete(id: $id)
}"#;

    type Variables = IdVariables;
    type Data = DeleteServiceData;
}
