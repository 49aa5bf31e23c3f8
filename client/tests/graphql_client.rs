#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use serde_json::json;
use station_client::{ClientError, GraphqlClient, LoaderClient};
use station_protocol::GraphqlRequest;
use station_protocol::operations::{
    CreateProject, DeleteService, IdVariables, InputVariables, ListProjects,
    ListProjectsVariables, ProjectCreateInput,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GraphqlClient {
    GraphqlClient::new(format!("{}/graphql/v2", server.uri()), "secret-token").unwrap()
}

fn empty_projects() -> serde_json::Value {
    json!({
        "data": {
            "projects": {
                "edges": [],
                "pageInfo": {
                    "startCursor": null,
                    "endCursor": null,
                    "hasNextPage": false,
                    "hasPreviousPage": false
                }
            }
        }
    })
}

#[tokio::test]
async fn sends_bearer_token_and_operation_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql/v2"))
        .and(header("authorization", "Bearer secret-token"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({ "operationName": "ListProjects" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_projects()))
        .expect(1)
        .mount(&server)
        .await;

    let data = client_for(&server)
        .request::<ListProjects>(&ListProjectsVariables::default())
        .await
        .unwrap();

    assert!(data.projects.is_empty());
}

#[tokio::test]
async fn decodes_mutation_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": { "input": { "name": "Demo", "isPublic": true } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "projectCreate": { "id": "p1", "name": "Demo" } }
        })))
        .mount(&server)
        .await;

    let vars = InputVariables {
        input: ProjectCreateInput {
            name: "Demo".to_string(),
            is_public: Some(true),
            ..Default::default()
        },
    };
    let data = client_for(&server)
        .request::<CreateProject>(&vars)
        .await
        .unwrap();

    assert_eq!(data.project_create.id, "p1");
    assert_eq!(data.project_create.name, "Demo");
}

#[tokio::test]
async fn graphql_errors_surface_with_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "not found", "path": ["serviceDelete"] }]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .request::<DeleteService>(&IdVariables::new("s1"))
        .await
        .unwrap_err();

    let errors = err.graphql_errors().expect("graphql errors");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "not found");
    assert!(!err.is_transport());
    assert!(!err.has_partial_data());
}

#[tokio::test]
async fn partial_data_is_kept_on_graphql_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "projects": null },
            "errors": [{ "message": "team access denied" }]
        })))
        .mount(&server)
        .await;

    let request = GraphqlRequest::new("query { projects { edges { cursor } } }", None);
    let err = client_for(&server).raw_request(&request).await.unwrap_err();

    assert!(err.has_partial_data());
    assert_eq!(err.to_string(), "team access denied");
}

#[tokio::test]
async fn html_error_page_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<h1>maintenance</h1>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .request::<ListProjects>(&ListProjectsVariables::default())
        .await
        .unwrap_err();

    assert!(err.is_transport());
    assert!(matches!(err, ClientError::Status { status: 503, .. }));
}

#[tokio::test]
async fn failed_request_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let result = client_for(&server)
        .request::<ListProjects>(&ListProjectsVariables::default())
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = GraphqlClient::new(format!("{uri}/graphql/v2"), "token").unwrap();
    let err = client
        .request::<ListProjects>(&ListProjectsVariables::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Network(_)));
}

#[tokio::test]
async fn cors_header_is_opt_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("access-control-allow-origin", "*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_projects()))
        .expect(1)
        .mount(&server)
        .await;

    let client = GraphqlClient::builder()
        .endpoint(format!("{}/graphql/v2", server.uri()))
        .token("secret-token")
        .with_cors_header(true)
        .build()
        .unwrap();

    client
        .request::<ListProjects>(&ListProjectsVariables::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn loader_reads_server_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loaders/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&empty_projects()["data"]))
        .expect(1)
        .mount(&server)
        .await;

    let loader = LoaderClient::new(&server.uri()).unwrap();
    let data = loader.projects().await.unwrap();

    assert!(data.projects.is_empty());
}
