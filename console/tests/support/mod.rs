#![allow(dead_code)]

use serde_json::{Value, json};
use station_client::GraphqlClient;
use station_console::{AutoConfirm, Console, Route};
use station_protocol::operations::{ListProjectsData, ReadProjectData};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockBuilder, MockServer};

pub fn console_for(server: &MockServer, confirm: bool, route: Route) -> Console {
    let client = GraphqlClient::new(format!("{}/graphql", server.uri()), "test-token").unwrap();
    Console::builder(client)
        .confirm(AutoConfirm(confirm))
        .initial_route(route)
        .build()
}

/// Mock for one named operation.
pub fn operation(name: &str) -> MockBuilder {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_partial_json(json!({ "operationName": name })))
}

fn page_info() -> Value {
    json!({
        "startCursor": null,
        "endCursor": null,
        "hasNextPage": false,
        "hasPreviousPage": false
    })
}

pub fn projects_json(projects: &[(&str, &str)]) -> Value {
    let edges: Vec<Value> = projects
        .iter()
        .map(|(id, name)| {
            json!({
                "cursor": id,
                "node": {
                    "id": id,
                    "name": name,
                    "description": null,
                    "isPublic": true,
                    "isTempProject": false,
                    "subscriptionType": "hobby",
                    "subscriptionPlanLimit": null,
                    "createdAt": "2024-05-01T12:00:00Z",
                    "deletedAt": null,
                    "teamId": null,
                    "team": null
                }
            })
        })
        .collect();
    json!({ "projects": { "edges": edges, "pageInfo": page_info() } })
}

pub fn project_json(id: &str, environments: &[(&str, &str)], services: &[(&str, &str)]) -> Value {
    let connection = |items: &[(&str, &str)]| {
        let edges: Vec<Value> = items
            .iter()
            .map(|(id, name)| json!({ "cursor": id, "node": { "id": id, "name": name } }))
            .collect();
        json!({ "edges": edges, "pageInfo": page_info() })
    };
    json!({
        "project": {
            "id": id,
            "name": "Demo",
            "environments": connection(environments),
            "services": connection(services)
        }
    })
}

pub fn projects_data(projects: &[(&str, &str)]) -> ListProjectsData {
    serde_json::from_value(projects_json(projects)).unwrap()
}

pub fn project_data(id: &str, environments: &[(&str, &str)], services: &[(&str, &str)]) -> ReadProjectData {
    serde_json::from_value(project_json(id, environments, services)).unwrap()
}
