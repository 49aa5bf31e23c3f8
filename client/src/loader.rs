use serde::de::DeserializeOwned;
use station_protocol::operations::{ListProjectsData, ReadProjectData};
use url::Url;

use crate::{ClientError, ClientResult};

/// Reads server-computed view data from a `station-server` instance.
///
/// The server runs the same queries the views would, with its own
/// credential; the results seed a local cache so the first render does not
/// fetch again.
#[derive(Debug, Clone)]
pub struct LoaderClient {
    http: reqwest::Client,
    base: Url,
}

impl LoaderClient {
    pub fn new(base: &str) -> ClientResult<Self> {
        let mut base = Url::parse(base)
            .map_err(|e| ClientError::InvalidConfig(format!("server url {base}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    /// URL of the passthrough GraphQL endpoint on the same server.
    pub fn graphql_endpoint(&self) -> ClientResult<Url> {
        self.join("graphql")
    }

    /// Data for the project list view.
    pub async fn projects(&self) -> ClientResult<ListProjectsData> {
        self.get(self.join("loaders/projects")?).await
    }

    /// Data for one project's detail (environments and services).
    pub async fn project(&self, id: &str) -> ClientResult<ReadProjectData> {
        self.get(self.project_url(id)?).await
    }

    /// `loaders/projects/<id>` with `id` escaped as a single path segment.
    fn project_url(&self, id: &str) -> ClientResult<Url> {
        let mut url = self.join("loaders/projects")?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidConfig(format!("server url {} has no path", self.base)))?
            .push(id);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> ClientResult<T> {
        tracing::debug!(%url, "loading server snapshot");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn join(&self, path: &str) -> ClientResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ClientError::InvalidConfig(format!("{path}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn joins_paths_below_a_prefixed_base() {
        let loader = LoaderClient::new("http://localhost:3000/console")
            .unwrap_or_else(|e| panic!("loader: {e}"));

        let endpoint = loader
            .graphql_endpoint()
            .unwrap_or_else(|e| panic!("join: {e}"));
        assert_eq!(endpoint.as_str(), "http://localhost:3000/console/graphql");
    }

    #[test]
    fn project_ids_stay_one_path_segment() {
        let loader =
            LoaderClient::new("http://localhost:3000/").unwrap_or_else(|e| panic!("loader: {e}"));

        let plain = loader.project_url("p1").unwrap_or_else(|e| panic!("url: {e}"));
        assert_eq!(plain.as_str(), "http://localhost:3000/loaders/projects/p1");

        let awkward = loader
            .project_url("a/b?c#d")
            .unwrap_or_else(|e| panic!("url: {e}"));
        assert_eq!(
            awkward.as_str(),
            "http://localhost:3000/loaders/projects/a%2Fb%3Fc%23d"
        );
        assert_eq!(awkward.query(), None);
        assert_eq!(awkward.fragment(), None);
    }
}
