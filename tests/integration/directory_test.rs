//! Integration tests for the directory tree routes.

mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
async fn test_health_reports_store() {
    let app = helpers::TestApp::new();
    let req = Request::builder()
        .uri("/console/api/health")
        .body(Body::empty())
        .unwrap();

    let response = app.send(req).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["store"], "memory");
}

#[tokio::test]
async fn test_missing_identity_headers() {
    let app = helpers::TestApp::new();
    let req = Request::builder()
        .uri("/console/api/directory")
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(req).await.status, StatusCode::UNAUTHORIZED);

    let response = app.request("superuser", "GET", "/directory", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_created_root_appears_in_tree() {
    let app = helpers::TestApp::new();
    let id = app.create_dir("root1", None).await;

    let tree = app.tree().await;
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0]["id"], id.as_str());
    assert_eq!(tree[0]["name"], "root1");
    assert_eq!(tree[0]["type"], "app");
    assert_eq!(tree[0]["level"], 0);
    assert_eq!(tree[0]["parent_id"], Value::Null);
    assert_eq!(tree[0]["sub_dir"], json!([]));
    assert_eq!(tree[0]["binding_count"], 0);

    let response = app
        .request("editor", "GET", "/directory?type=knowledge", None)
        .await;
    assert_eq!(response.body["dir_tree"], json!([]));
}

#[tokio::test]
async fn test_nested_tree_and_subtree() {
    let app = helpers::TestApp::new();
    let root = app.create_dir("root", None).await;
    let a = app.create_dir("A", Some(&root)).await;
    app.create_dir("B", Some(&root)).await;
    let c = app.create_dir("C", Some(&a)).await;

    let tree = app.tree().await;
    let children = tree[0]["sub_dir"].as_array().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0]["name"], "A");
    assert_eq!(children[1]["name"], "B");
    assert_eq!(children[0]["sub_dir"][0]["id"], c.as_str());
    assert_eq!(children[0]["sub_dir"][0]["level"], 2);

    let response = app
        .request("admin", "GET", &format!("/directory/{a}?type=app"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let sub = &response.body["dir_tree"];
    assert_eq!(sub.as_array().unwrap().len(), 1);
    assert_eq!(sub[0]["id"], a.as_str());
    assert_eq!(sub[0]["sub_dir"][0]["name"], "C");

    let response = app
        .request("admin", "GET", &format!("/directory/{a}"), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_validates_input() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "owner",
            "POST",
            "/directory",
            Some(json!({ "name": "x", "type": "folder" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "owner",
            "POST",
            "/directory",
            Some(json!({ "name": "x", "type": "app", "parent_id": "not-a-uuid" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Invalid UUID format in parent_id.");

    let response = app
        .request("owner", "POST", "/directory", Some(json!({ "type": "app" })))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert!(app.tree().await.is_empty());
}

#[tokio::test]
async fn test_duplicate_sibling_name() {
    let app = helpers::TestApp::new();
    app.create_dir("docs", None).await;

    let response = app
        .request(
            "owner",
            "POST",
            "/directory",
            Some(json!({ "name": "docs", "type": "app" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "create directory failed, please change another directory name."
    );
}

#[tokio::test]
async fn test_rename_and_rename_conflict() {
    let app = helpers::TestApp::new();
    let id = app.create_dir("old", None).await;
    app.create_dir("taken", None).await;

    let response = app
        .request(
            "admin",
            "PATCH",
            &format!("/directory/{id}"),
            Some(json!({ "name": "new" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!({ "result": "success", "message": "Directory updated successfully" })
    );
    assert_eq!(app.tree().await[0]["name"], "new");

    let response = app
        .request(
            "admin",
            "PATCH",
            &format!("/directory/{id}"),
            Some(json!({ "name": "taken" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "update directory failed, please change another directory name."
    );
}

#[tokio::test]
async fn test_delete_requires_leaf() {
    let app = helpers::TestApp::new();
    let parent = app.create_dir("parent", None).await;
    let child = app.create_dir("child", Some(&parent)).await;

    let response = app
        .request("owner", "DELETE", &format!("/directory/{parent}"), None)
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app
        .request("owner", "DELETE", &format!("/directory/{child}"), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Directory deleted successfully");

    let tree = app.tree().await;
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0]["sub_dir"], json!([]));
}

#[tokio::test]
async fn test_move_directory_rules() {
    let app = helpers::TestApp::new();
    let a = app.create_dir("a", None).await;
    let b = app.create_dir("b", Some(&a)).await;

    let response = app
        .request(
            "owner",
            "PUT",
            &format!("/directory/{a}"),
            Some(json!({ "parent_id": b })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "owner",
            "PUT",
            &format!("/directory/{b}"),
            Some(json!({ "parent_id": null })),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Directory moved successfully");

    let tree = app.tree().await;
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[1]["id"], b.as_str());
    assert_eq!(tree[1]["level"], 0);
}

#[tokio::test]
async fn test_move_without_parent_key_is_rejected() {
    let app = helpers::TestApp::new();
    let a = app.create_dir("a", None).await;
    let b = app.create_dir("b", Some(&a)).await;

    let response = app
        .request("owner", "PUT", &format!("/directory/{b}"), Some(json!({})))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let tree = app.tree().await;
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0]["sub_dir"][0]["id"], b.as_str());
    assert_eq!(tree[0]["sub_dir"][0]["level"], 1);
}

#[tokio::test]
async fn test_directories_are_tenant_scoped() {
    let app = helpers::TestApp::new();
    let id = app.create_dir("mine", None).await;

    let response = app
        .request_as(
            Uuid::new_v4(),
            "owner",
            "DELETE",
            &format!("/directory/{id}"),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], format!("Directory {id} not found"));

    let response = app
        .request("owner", "GET", "/directory/not-a-uuid?type=app", None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_role_guards() {
    let app = helpers::TestApp::new();

    let response = app
        .request(
            "editor",
            "POST",
            "/directory",
            Some(json!({ "name": "x", "type": "app" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request("normal", "GET", "/directory", None).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("dataset_operator", "GET", "/directory?type=knowledge", None)
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "normal",
            "POST",
            "/directory-bindings/remove",
            Some(json!({ "target_ids": [Uuid::new_v4()], "type": "app" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
