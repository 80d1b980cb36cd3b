#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use common::state;
use serde_json::{json, Value};

#[actix_web::test]
async fn user_lifecycle() {
    let state = state().await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({"name": "Ann", "email": "ann@example.com"}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "Ann");

    let req = test::TestRequest::patch()
        .uri(&format!("/users/{id}"))
        .set_json(json!({"name": "Anna"}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["name"], "Anna");
    assert_eq!(updated["email"], "ann@example.com");

    let req = test::TestRequest::get().uri("/users").to_request();
    let all: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/users/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/users/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], format!("User with id not found: {id}"));
}

#[actix_web::test]
async fn duplicate_email_is_a_conflict() {
    let state = state().await;
    let app = app!(state);

    for (name, expected) in [("Ann", StatusCode::OK), ("Other Ann", StatusCode::CONFLICT)] {
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(json!({"name": name, "email": "ann@example.com"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "{name}");
    }
}

#[actix_web::test]
async fn updating_unknown_user_is_not_found() {
    let state = state().await;
    let app = app!(state);

    let req = test::TestRequest::patch()
        .uri("/users/42")
        .set_json(json!({"email": "ghost@example.com"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn non_numeric_id_is_a_client_error() {
    let state = state().await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/users/abc").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
