use std::future::Future;
use std::pin::Pin;

use station_cache::{CacheError, Snapshot};
use station_client::{ClientError, GraphqlClient};
use station_protocol::operations::{
    IdVariables, ListProjects, ListProjectsData, ListProjectsVariables, ReadProject,
    ReadProjectData,
};

use crate::{Console, keys};

type Pending<T> = Pin<Box<dyn Future<Output = Result<T, ClientError>> + Send>>;

fn list_projects(
    client: &GraphqlClient,
) -> impl Fn() -> Pending<ListProjectsData> + Send + Sync + 'static {
    let client = client.clone();
    move || -> Pending<ListProjectsData> {
        let client = client.clone();
        Box::pin(async move {
            client
                .request::<ListProjects>(&ListProjectsVariables::default())
                .await
        })
    }
}

fn read_project(
    client: &GraphqlClient,
    id: &str,
) -> impl Fn() -> Pending<ReadProjectData> + Send + Sync + 'static {
    let client = client.clone();
    let id = id.to_string();
    move || -> Pending<ReadProjectData> {
        let client = client.clone();
        let variables = IdVariables::new(id.clone());
        Box::pin(async move { client.request::<ReadProject>(&variables).await })
    }
}

/// Stale-while-revalidate read of `["projects"]`.
pub(crate) fn projects(console: &Console) -> Result<Snapshot<ListProjectsData>, CacheError> {
    console
        .cache()
        .read(&keys::projects(), list_projects(console.client()))
}

/// Stale-while-revalidate read of `["project", id]`.
pub(crate) fn project(console: &Console, id: &str) -> Result<Snapshot<ReadProjectData>, CacheError> {
    console
        .cache()
        .read(&keys::project(id), read_project(console.client(), id))
}
