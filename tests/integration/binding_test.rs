//! Integration tests for filing targets into directories.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use starry_entity::binding::TargetType;

#[tokio::test]
async fn test_rebinding_moves_target() {
    let app = helpers::TestApp::new();
    let d1 = app.create_dir("d1", None).await;
    let d2 = app.create_dir("d2", None).await;
    let x = app.app_target().await;

    for directory_id in [&d1, &d2] {
        let response = app.bind(directory_id, &[x]).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    }

    assert_eq!(app.store.binding_rows().await, 1);
    assert_eq!(
        app.store.target_directory(TargetType::App, x).await,
        Some(Some(d2.parse::<Uuid>().unwrap()))
    );

    let tree = app.tree().await;
    assert_eq!(tree[0]["binding_count"], 0);
    assert_eq!(tree[1]["binding_count"], 1);
}

#[tokio::test]
async fn test_failed_refile_leaves_bindings_untouched() {
    let app = helpers::TestApp::new();
    let d1 = app.create_dir("d1", None).await;
    let d2 = app.create_dir("d2", None).await;
    let x = app.app_target().await;
    assert_eq!(app.bind(&d1, &[x]).await.status, StatusCode::OK);

    let response = app.bind(&d2, &[x, Uuid::new_v4()]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    assert_eq!(app.store.binding_rows().await, 1);
    assert_eq!(
        app.store.target_directory(TargetType::App, x).await,
        Some(Some(d1.parse::<Uuid>().unwrap()))
    );
}

#[tokio::test]
async fn test_remove_bindings() {
    let app = helpers::TestApp::new();
    let d1 = app.create_dir("d1", None).await;
    let x = app.app_target().await;

    let response = app
        .request(
            "dataset_operator",
            "POST",
            "/directory-bindings/create",
            Some(json!({ "target_ids": [x], "directory_id": d1, "type": "app" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let remove = json!({ "target_ids": [x], "type": "app" });
    let response = app
        .request("editor", "POST", "/directory-bindings/remove", Some(remove.clone()))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.store.binding_rows().await, 0);
    assert_eq!(app.store.target_directory(TargetType::App, x).await, Some(None));

    // Removing again is not an error.
    let response = app
        .request("editor", "POST", "/directory-bindings/remove", Some(remove))
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_binding_errors() {
    let app = helpers::TestApp::new();
    let d1 = app.create_dir("d1", None).await;
    let x = app.app_target().await;

    for path in ["/directory-bindings/remove", "/directory-bindings/create"] {
        let response = app
            .request(
                "editor",
                "POST",
                path,
                Some(json!({ "target_ids": [x], "directory_id": d1, "type": "workflow" })),
            )
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(response.body["message"], "Invalid binding type");
    }

    let response = app
        .request(
            "editor",
            "POST",
            "/directory-bindings/remove",
            Some(json!({ "target_ids": [x] })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.bind(&d1, &[Uuid::new_v4()]).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "App not found");

    let response = app.bind(&d1, &[]).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_directory_bindings() {
    let app = helpers::TestApp::new();
    let d1 = app.create_dir("d1", None).await;
    let d2 = app.create_dir("d2", None).await;
    let x = app.app_target().await;
    let y = app.app_target().await;
    let z = app.app_target().await;
    assert_eq!(app.bind(&d1, &[x, y]).await.status, StatusCode::OK);
    assert_eq!(app.bind(&d2, &[z]).await.status, StatusCode::OK);

    let response = app
        .request("editor", "GET", &format!("/directory/{d1}/bindings?limit=1"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 2);
    assert_eq!(response.body["page"], 1);
    assert_eq!(response.body["limit"], 1);
    assert_eq!(response.body["has_more"], true);
    assert_eq!(response.body["data"][0]["target_id"], x.to_string());

    let response = app
        .request(
            "editor",
            "GET",
            &format!("/directory/{d1}/bindings?page=2&limit=1"),
            None,
        )
        .await;
    assert_eq!(response.body["data"][0]["target_id"], y.to_string());
    assert_eq!(response.body["has_more"], false);

    let response = app
        .request("normal", "GET", &format!("/directory/{d1}/bindings"), None)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request_as(
            Uuid::new_v4(),
            "editor",
            "GET",
            &format!("/directory/{d1}/bindings"),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
