#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use station_common::StationConfig;
use station_server::ServerError;
use tokio::sync::oneshot;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Running {
    addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl Running {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn shutdown(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.task.await.expect("server task");
    }
}

fn config_for(upstream: &MockServer) -> StationConfig {
    StationConfig {
        endpoint: format!("{}/graphql", upstream.uri()),
        token: Some("server-token".to_string()),
        ..StationConfig::default()
    }
}

async fn start(upstream: &MockServer) -> Running {
    let (listener, state) = station_server::bind(&config_for(upstream), "127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        station_server::serve(listener, state, async {
            let _ = stopped.await;
        })
        .await
        .expect("serve");
    });
    Running {
        addr,
        stop: Some(stop),
        task,
    }
}

fn projects_page() -> Value {
    json!({
        "projects": {
            "edges": [{
                "cursor": "c1",
                "node": { "id": "p1", "name": "Demo", "isPublic": true }
            }],
            "pageInfo": { "hasNextPage": false, "hasPreviousPage": false }
        }
    })
}

#[tokio::test]
async fn healthz_answers_ok() {
    let upstream = MockServer::start().await;
    let server = start(&upstream).await;

    let response = reqwest::get(server.url("/healthz")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
    server.shutdown().await;
}

#[tokio::test]
async fn graphql_is_forwarded_with_the_server_credential() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", "Bearer server-token"))
        .and(header("access-control-allow-origin", "*"))
        .and(body_partial_json(json!({ "variables": { "first": 5 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": projects_page() })))
        .expect(1)
        .mount(&upstream)
        .await;
    let server = start(&upstream).await;

    let response = reqwest::Client::new()
        .post(server.url("/graphql"))
        .json(&json!({ "query": "query { projects { edges { node { id } } } }", "variables": { "first": 5 } }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"], projects_page());
    assert!(body.get("errors").is_none());
    server.shutdown().await;
}

#[tokio::test]
async fn bind_requires_a_token() {
    let upstream = MockServer::start().await;
    let config = StationConfig {
        token: None,
        ..config_for(&upstream)
    };

    let err = station_server::bind(&config, "127.0.0.1:0").await.unwrap_err();

    assert!(matches!(err, ServerError::Config(_)), "{err}");
}

#[tokio::test]
async fn graphql_errors_keep_status_200() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "serviceDelete": null },
            "errors": [{ "message": "Service not found" }]
        })))
        .mount(&upstream)
        .await;
    let server = start(&upstream).await;

    let response = reqwest::Client::new()
        .post(server.url("/graphql"))
        .json(&json!({ "query": "mutation { serviceDelete(id: \"s1\") }" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["message"], "Service not found");
    assert_eq!(body["data"], json!({ "serviceDelete": null }));
    server.shutdown().await;
}

#[tokio::test]
async fn upstream_transport_failure_is_a_bad_gateway() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&upstream)
        .await;
    let server = start(&upstream).await;

    let response = reqwest::Client::new()
        .post(server.url("/graphql"))
        .json(&json!({ "query": "query { me { id } }" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    let message = body["errors"][0]["message"].as_str().unwrap();
    assert!(message.contains("500"), "{message}");
    server.shutdown().await;
}

#[tokio::test]
async fn malformed_body_is_rejected_without_calling_upstream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let server = start(&upstream).await;

    let response = reqwest::Client::new()
        .post(server.url("/graphql"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["errors"][0]["message"].is_string());
    server.shutdown().await;
}

#[tokio::test]
async fn loaders_return_view_data() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "ListProjects" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": projects_page() })))
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "ReadProject", "variables": { "id": "p1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "project": { "id": "p1", "name": "Demo" } }
        })))
        .mount(&upstream)
        .await;
    let server = start(&upstream).await;
    let loader = station_client::LoaderClient::new(&server.url("/")).unwrap();

    let projects = loader.projects().await.unwrap();
    let project = loader.project("p1").await.unwrap();

    assert_eq!(projects.projects.nodes().next().unwrap().name, "Demo");
    assert_eq!(project.project.id, "p1");
    assert!(project.project.services.is_empty());
    server.shutdown().await;
}

#[tokio::test]
async fn loader_failures_surface_upstream_errors() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "Not Authorized" }]
        })))
        .mount(&upstream)
        .await;
    let server = start(&upstream).await;

    let response = reqwest::get(server.url("/loaders/projects/p1")).await.unwrap();

    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["message"], "Not Authorized");
    server.shutdown().await;
}
