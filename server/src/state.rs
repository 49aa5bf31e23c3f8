use station_client::GraphqlClient;

/// Shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    client: GraphqlClient,
}

impl AppState {
    pub fn new(client: GraphqlClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GraphqlClient {
        &self.client
    }
}
