#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use pretty_assertions::assert_eq;
use serde_json::json;
use station_console::views::{CreateServiceView, SelectorModel, ServiceListContent, ServiceListView};
use station_console::{DeleteOutcome, Level, Route};
use support::{console_for, operation, project_data, project_json, projects_data};
use wiremock::matchers::body_partial_json;
use wiremock::{MockServer, ResponseTemplate};

fn labels(view: &ServiceListView) -> Vec<String> {
    view.render()
        .unwrap()
        .cards()
        .iter()
        .map(|card| card.label.clone())
        .collect()
}

#[tokio::test]
async fn no_selection_prompts_for_a_project() {
    let server = MockServer::start().await;
    let console = console_for(&server, true, Route::Services { project_id: None });

    let view = ServiceListView::mount(
        &console,
        None,
        Some(projects_data(&[("p1", "api"), ("p2", "web")])),
        None,
    )
    .unwrap();
    let model = view.render().unwrap();

    assert_eq!(
        model.content,
        ServiceListContent::NoSelection {
            prompt: "Select a project to view all services within it."
        }
    );
    assert_eq!(model.selector.options().len(), 2);
    assert_eq!(
        view.delete("s1").await,
        DeleteOutcome::Failed {
            message: "Select a project to view all services within it.".to_string()
        }
    );
}

#[tokio::test]
async fn selector_offers_project_creation_when_there_are_none() {
    let server = MockServer::start().await;
    let console = console_for(&server, true, Route::Services { project_id: None });

    let view = ServiceListView::mount(&console, None, Some(projects_data(&[])), None).unwrap();

    assert_eq!(
        view.render().unwrap().selector,
        SelectorModel::CreateProject {
            label: "Create a project",
            route: Route::NewProject
        }
    );
}

#[tokio::test]
async fn selecting_a_project_loads_its_services_and_updates_the_route() {
    let server = MockServer::start().await;
    operation("ReadProject")
        .and(body_partial_json(json!({ "variables": { "id": "p1" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": project_json("p1", &[("e1", "production")], &[("s1", "api"), ("s2", "")])
        })))
        .expect(1)
        .mount(&server)
        .await;
    let console = console_for(&server, true, Route::Services { project_id: None });
    let mut view =
        ServiceListView::mount(&console, None, Some(projects_data(&[("p1", "Demo")])), None).unwrap();

    view.select_project(Some("p1".to_string())).unwrap();
    let model = view.settled().await.unwrap();

    let cards = model.cards();
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].link, "/project/p1/service/s1");
    assert_eq!(cards[1].label, "s2");
    assert_eq!(
        console.navigator().current(),
        Route::Services {
            project_id: Some("p1".to_string())
        }
    );
}

#[tokio::test]
async fn failed_service_delete_leaves_the_list_unchanged() {
    let server = MockServer::start().await;
    operation("DeleteService")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{ "message": "Service not found" }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    operation("ReadProject")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": project_json("p1", &[], &[])
        })))
        .expect(0)
        .mount(&server)
        .await;
    let console = console_for(
        &server,
        true,
        Route::Services {
            project_id: Some("p1".to_string()),
        },
    );
    let view = ServiceListView::mount(
        &console,
        Some("p1".to_string()),
        Some(projects_data(&[("p1", "Demo")])),
        Some(project_data("p1", &[("e1", "production")], &[("s1", "api")])),
    )
    .unwrap();

    let outcome = view.delete("s1").await;

    let DeleteOutcome::Failed { message } = &outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(message.contains("not found"), "{message}");
    assert_eq!(labels(&view), vec!["api".to_string()]);

    let notifications = console.notifications().active();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].level, Level::Error);
    assert!(notifications[0].message.contains("not found"));
}

#[tokio::test]
async fn docker_service_is_created_and_redirects_to_its_project() {
    let server = MockServer::start().await;
    operation("ReadProject")
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": project_json("p1", &[("e1", "production"), ("e2", "staging")], &[])
        })))
        .mount(&server)
        .await;
    operation("CreateService")
        .and(body_partial_json(json!({
            "variables": { "input": {
                "projectId": "p1",
                "environmentId": "e2",
                "name": "cache",
                "source": { "image": "redis:7" }
            } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "serviceCreate": { "id": "s9", "name": "cache", "projectId": "p1" } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let console = console_for(&server, true, Route::NewService);
    let mut route = console.navigator().subscribe();
    let mut view = CreateServiceView::mount(&console, Some(projects_data(&[("p1", "Demo")]))).unwrap();

    assert_eq!(view.project_options().unwrap().options().len(), 1);
    assert!(view.environment_options().unwrap().is_empty());

    view.select_project("p1").unwrap();
    let environments = view.environments_settled().await.unwrap();
    assert_eq!(environments.len(), 2);

    {
        let mut form = view.form().lock();
        form.set_field("environmentId", "e2").unwrap();
        form.set_field("name", "cache").unwrap();
        form.set_field("type", "docker").unwrap();
        form.set_field("dockerImage", "redis:7").unwrap();
        assert!(!form.is_enabled("repoUrl"));
        assert!(form.can_submit());
    }
    let created = view.submit().await.unwrap();

    assert_eq!(created.id, "s9");
    assert_eq!(
        console.notifications().active()[0].message,
        "Service cache has been created! Will redirect in 3 seconds."
    );
    assert_eq!(console.navigator().current(), Route::NewService);

    tokio::task::yield_now().await;
    tokio::time::pause();
    tokio::time::timeout(std::time::Duration::from_secs(4), route.changed())
        .await
        .expect("redirect after the delay")
        .unwrap();
    assert_eq!(
        console.navigator().current(),
        Route::Services {
            project_id: Some("p1".to_string())
        }
    );
}
