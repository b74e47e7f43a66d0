use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use catalog_server::entity::comment;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn add_comment_returns_created_with_location() {
    let app = TestApp::spawn().await;
    let product_id = app.create_product("Reviewed", 1).await;

    let res = app
        .post_json(
            routes::COMMENTS,
            &json!({"product_id": product_id, "description": "Great product"}),
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    let id = res.id();
    assert_eq!(res.location.as_deref(), Some(routes::comment(id).as_str()));
    assert_eq!(res.body["product_id"], product_id);
    assert_eq!(res.body["description"], "Great product");
    assert!(res.body["created_at"].is_string());
}

#[tokio::test]
async fn add_comment_without_description() {
    let app = TestApp::spawn().await;
    let product_id = app.create_product("Quiet", 1).await;

    let res = app
        .post_json(routes::COMMENTS, &json!({"product_id": product_id}))
        .await;

    assert_eq!(res.status, 201);
    assert!(res.body["description"].is_null());
}

#[tokio::test]
async fn add_comment_to_missing_product_returns_404() {
    let app = TestApp::spawn().await;

    let res = app
        .post_json(
            routes::COMMENTS,
            &json!({"product_id": 999, "description": "Nobody home"}),
        )
        .await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
    assert_eq!(res.body["message"], "Product with ID 999 not found.");
}

#[tokio::test]
async fn add_comment_rejects_malformed_body() {
    let app = TestApp::spawn().await;

    let res = app
        .post_json(routes::COMMENTS, &json!({"description": "no product"}))
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn get_comment_returns_it() {
    let app = TestApp::spawn().await;
    let product_id = app.create_product("Lookup", 1).await;
    let id = app.create_comment(product_id, "Findable").await;

    let res = app.get(&routes::comment(id)).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["id"], id);
    assert_eq!(res.body["description"], "Findable");
}

#[tokio::test]
async fn get_missing_comment_returns_404() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::comment(4242)).await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn delete_comment_then_delete_again() {
    let app = TestApp::spawn().await;
    let product_id = app.create_product("Moderated", 1).await;
    let id = app.create_comment(product_id, "Spam").await;

    let first = app.delete(&routes::comment(id)).await;
    assert_eq!(first.status, 204);
    assert_eq!(app.get(&routes::comment(id)).await.status, 404);

    let second = app.delete(&routes::comment(id)).await;
    assert_eq!(second.status, 404);

    // The product itself is untouched.
    assert_eq!(app.get(&routes::product(product_id)).await.status, 200);
}

#[tokio::test]
async fn list_product_comments_oldest_first() {
    let app = TestApp::spawn().await;
    let product_id = app.create_product("Chatty", 1).await;
    let other_id = app.create_product("Other", 1).await;
    app.create_comment(product_id, "one").await;
    app.create_comment(other_id, "elsewhere").await;
    app.create_comment(product_id, "two").await;

    let res = app.get(&routes::product_comments(product_id)).await;

    assert_eq!(res.status, 200);
    let descriptions: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["description"].as_str().unwrap())
        .collect();
    assert_eq!(descriptions, ["one", "two"]);
}

#[tokio::test]
async fn list_comments_of_missing_product_returns_404() {
    let app = TestApp::spawn().await;

    let res = app.get(&routes::product_comments(77)).await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn deleting_product_removes_its_comments() {
    let app = TestApp::spawn().await;
    let product_id = app.create_product("Cascade", 1).await;
    let a = app.create_comment(product_id, "a").await;
    let b = app.create_comment(product_id, "b").await;

    let res = app.delete(&routes::product(product_id)).await;
    assert_eq!(res.status, 204);

    assert_eq!(app.get(&routes::comment(a)).await.status, 404);
    assert_eq!(app.get(&routes::comment(b)).await.status, 404);

    let remaining = comment::Entity::find()
        .filter(comment::Column::ProductId.eq(product_id))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}
