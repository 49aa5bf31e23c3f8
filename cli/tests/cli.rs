#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use anyhow::Result;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `station` with an isolated home, no ambient token, run from `cwd` so no
/// stray `.env` is picked up.
fn station(home: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("station")?;
    cmd.env("STATION_HOME", home)
        .env_remove("RAILWAY_TOKEN")
        .env_remove("STATION_ENDPOINT")
        .env_remove("RUST_LOG")
        .current_dir(home);
    Ok(cmd)
}

#[test]
fn help_lists_the_commands() -> Result<()> {
    let home = TempDir::new()?;
    station(home.path())?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("projects"))
        .stdout(predicate::str::contains("services"))
        .stdout(predicate::str::contains("serve"));
    Ok(())
}

#[test]
fn api_commands_need_a_token() -> Result<()> {
    let home = TempDir::new()?;
    station(home.path())?
        .args(["projects", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no API token configured"));
    Ok(())
}

#[test]
fn broken_config_file_is_reported() -> Result<()> {
    let home = TempDir::new()?;
    std::fs::write(home.path().join("config.toml"), "stale_time_secs = \"soon\"")?;
    station(home.path())?
        .args(["projects", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config file"));
    Ok(())
}

#[test]
fn empty_project_name_fails_before_any_request() -> Result<()> {
    let home = TempDir::new()?;
    // Nothing listens on the discard port; a request would fail differently.
    station(home.path())?
        .env("RAILWAY_TOKEN", "test-token")
        .args(["--endpoint", "http://127.0.0.1:9/graphql", "projects", "create"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Name is required"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn lists_projects_from_the_api() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "ListProjects" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "projects": {
                "edges": [{
                    "cursor": "c1",
                    "node": { "id": "p1", "name": "Demo", "isPublic": true, "team": null }
                }],
                "pageInfo": { "hasNextPage": false, "hasPreviousPage": false }
            } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let endpoint = format!("{}/graphql", server.uri());
    let home = TempDir::new()?;

    let mut cmd = station(home.path())?;
    cmd.env("RAILWAY_TOKEN", "test-token")
        .args(["--endpoint", endpoint.as_str(), "projects", "list"]);
    let assert = tokio::task::spawn_blocking(move || cmd.assert()).await?;

    assert
        .success()
        .stdout(predicate::str::contains("Demo"))
        .stdout(predicate::str::contains("N/A"))
        .stdout(predicate::str::contains("https://railway.app/project/p1"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn declined_delete_sends_nothing() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "ListProjects" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "projects": { "edges": [], "pageInfo": {} } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "operationName": "DeleteProject" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let endpoint = format!("{}/graphql", server.uri());
    let home = TempDir::new()?;

    let mut cmd = station(home.path())?;
    cmd.env("RAILWAY_TOKEN", "test-token")
        .args(["--endpoint", endpoint.as_str(), "projects", "delete", "p1"])
        .write_stdin("n\n");
    let assert = tokio::task::spawn_blocking(move || cmd.assert()).await?;

    assert
        .success()
        .stderr(predicate::str::contains("Delete project?"))
        .stderr(predicate::str::contains("Cancelled."));
    Ok(())
}
