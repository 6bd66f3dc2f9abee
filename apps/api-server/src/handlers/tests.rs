use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use parley_infra::{JwtConfig, JwtTokenService};

use super::configure_routes;
use crate::state::AppState;

fn test_state() -> AppState {
    let tokens = Arc::new(JwtTokenService::new(JwtConfig {
        secret: "handler-test-secret".to_string(),
        expiration_hours: 1,
        issuer: "parley-test".to_string(),
    }));
    AppState::in_memory(tokens, 5)
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(test_state()))
                .configure(configure_routes),
        )
        .await
    };
}

macro_rules! register {
    ($app:expr, $email:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "email": $email, "password": "correct horse" }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        body["access_token"]
            .as_str()
            .expect("token in response")
            .to_string()
    }};
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_web::test]
async fn test_discussion_over_http() {
    let app = app!();
    let alice = register!(app, "alice@example.com");
    let bob = register!(app, "bob@example.com");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&alice))
        .set_json(json!({ "title": "Hello", "content": "First post" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let post_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{post_id}/comments"))
        .insert_header(bearer(&alice))
        .set_json(json!({ "content": "Great post!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Your comment has been added.");
    let c1 = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/comments/{c1}/replies"))
        .insert_header(bearer(&bob))
        .set_json(json!({ "content": "Agreed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Your reply has been added.");

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}/comments"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let threads = body["data"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["comment"]["content"], "Great post!");
    assert_eq!(threads[0]["replies"][0]["content"], "Agreed");

    let req = test::TestRequest::put()
        .uri(&format!("/api/comments/{c1}"))
        .insert_header(bearer(&bob))
        .set_json(json!({ "content": "edited" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/comments/{c1}"))
        .insert_header(bearer(&alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Your comment has been deleted.");

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}/comments"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_anonymous_comment_is_rejected() {
    let app = app!();
    let alice = register!(app, "alice@example.com");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&alice))
        .set_json(json!({ "title": "Hello", "content": "First post" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{post_id}/comments"))
        .set_json(json!({ "content": "drive-by" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_comment_validation_errors() {
    let app = app!();
    let alice = register!(app, "alice@example.com");

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&alice))
        .set_json(json!({ "title": "Hello", "content": "First post" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let post_id = body["data"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{post_id}/comments"))
        .insert_header(bearer(&alice))
        .set_json(json!({ "content": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let missing = uuid::Uuid::new_v4();
    let req = test::TestRequest::post()
        .uri(&format!("/api/posts/{missing}/comments"))
        .insert_header(bearer(&alice))
        .set_json(json!({ "content": "hi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 404);
}

#[actix_web::test]
async fn test_login_and_me() {
    let app = app!();
    register!(app, "Carol@Example.com");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "carol@example.com", "password": "wrong password" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "carol@example.com", "password": "correct horse" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(&token))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["email"], "carol@example.com");
}

#[actix_web::test]
async fn test_duplicate_registration_conflicts() {
    let app = app!();
    register!(app, "dave@example.com");

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "email": "dave@example.com", "password": "another one" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Email already registered");
}

#[actix_web::test]
async fn test_posts_by_tag_over_http() {
    let app = app!();
    let alice = register!(app, "erin@example.com");

    for (title, tags) in [("Tagged", json!(["Rust", "web"])), ("Plain", json!([]))] {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header(bearer(&alice))
            .set_json(json!({ "title": title, "content": "body", "tags": tags }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/posts/tags/RUST")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let posts = body["data"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Tagged");
    assert_eq!(posts[0]["tags"], json!(["rust", "web"]));

    let req = test::TestRequest::get()
        .uri("/api/posts/search?q=web")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
