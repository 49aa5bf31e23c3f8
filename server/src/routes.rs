use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use station_client::ClientError;
use station_protocol::operations::{
    IdVariables, ListProjects, ListProjectsData, ListProjectsVariables, ReadProject,
    ReadProjectData,
};
use station_protocol::{GraphqlRequest, GraphqlResponse};

use crate::{ApiError, AppState};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/graphql", post(handle_graphql))
        .route("/loaders/projects", get(handle_projects))
        .route("/loaders/projects/:id", get(handle_project))
        .route("/healthz", get(handle_health))
        .with_state(state)
}

/// Forward a GraphQL body upstream.
///
/// Upstream GraphQL errors are part of a normal answer and keep status 200;
/// only transport failures turn into 502.
async fn handle_graphql(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GraphqlResponse>, ApiError> {
    let request: GraphqlRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if request.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query is empty".to_string()));
    }

    match state.client().raw_request(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(ClientError::Graphql { errors, data }) => Ok(Json(GraphqlResponse {
            data,
            errors: Some(errors),
        })),
        Err(error) => {
            tracing::warn!("graphql passthrough failed: {error}");
            Err(error.into())
        }
    }
}

async fn handle_projects(State(state): State<AppState>) -> Result<Json<ListProjectsData>, ApiError> {
    let data = state
        .client()
        .request::<ListProjects>(&ListProjectsVariables::default())
        .await
        .inspect_err(|e| tracing::warn!("projects loader failed: {e}"))?;
    Ok(Json(data))
}

async fn handle_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReadProjectData>, ApiError> {
    let data = state
        .client()
        .request::<ReadProject>(&IdVariables::new(id.as_str()))
        .await
        .inspect_err(|e| tracing::warn!(project = %id, "project loader failed: {e}"))?;
    Ok(Json(data))
}

async fn handle_health() -> &'static str {
    "ok"
}
