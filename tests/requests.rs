#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use common::{ids, state, user};
use serde_json::{json, Value};
use shareit::extract::SHARER_USER_ID;

#[actix_web::test]
async fn request_lists_items_offered_for_it() {
    let state = state().await;
    let requester = user(&state, "Requester").await;
    let owner = user(&state, "Owner").await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/requests")
        .insert_header((SHARER_USER_ID, requester.id.to_string()))
        .set_json(json!({"description": "Need a ladder for the weekend"}))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let request_id = created["id"].as_i64().unwrap();
    assert_eq!(created["items"], json!([]));

    let req = test::TestRequest::post()
        .uri("/items")
        .insert_header((SHARER_USER_ID, owner.id.to_string()))
        .set_json(json!({
            "name": "Ladder",
            "description": "Three metres",
            "available": true,
            "requestId": request_id
        }))
        .to_request();
    let offered: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(offered["requestId"], request_id);

    let req = test::TestRequest::get()
        .uri(&format!("/requests/{request_id}"))
        .insert_header((SHARER_USER_ID, owner.id.to_string()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["description"], "Need a ladder for the weekend");
    assert_eq!(body["items"][0]["id"], offered["id"]);
    assert_eq!(body["items"][0]["ownerId"], owner.id);
}

#[actix_web::test]
async fn own_and_other_request_listings_are_disjoint() {
    let state = state().await;
    let ann = user(&state, "Ann").await;
    let bob = user(&state, "Bob").await;
    let app = app!(state);

    let mut created = Vec::new();
    for (author, text) in [(&ann, "Tent"), (&bob, "Kayak"), (&ann, "Stove")] {
        let req = test::TestRequest::post()
            .uri("/requests")
            .insert_header((SHARER_USER_ID, author.id.to_string()))
            .set_json(json!({"description": text}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        created.push(body["id"].as_i64().unwrap());
    }

    let req = test::TestRequest::get()
        .uri("/requests")
        .insert_header((SHARER_USER_ID, ann.id.to_string()))
        .to_request();
    let own: Value = test::call_and_read_body_json(&app, req).await;
    let mut own_ids = ids(&own);
    own_ids.sort_unstable();
    assert_eq!(own_ids, [created[0], created[2]]);

    let req = test::TestRequest::get()
        .uri("/requests/all?from=0&size=10")
        .insert_header((SHARER_USER_ID, ann.id.to_string()))
        .to_request();
    let others: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(&others), [created[1]]);
}

#[actix_web::test]
async fn unknown_request_is_not_found() {
    let state = state().await;
    let ann = user(&state, "Ann").await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/requests/77")
        .insert_header((SHARER_USER_ID, ann.id.to_string()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Item request not found");

    let req = test::TestRequest::post()
        .uri("/items")
        .insert_header((SHARER_USER_ID, ann.id.to_string()))
        .set_json(json!({
            "name": "Tent",
            "description": "Two person",
            "available": true,
            "requestId": 77
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn other_requests_page_by_index() {
    let state = state().await;
    let ann = user(&state, "Ann").await;
    let bob = user(&state, "Bob").await;
    let app = app!(state);

    for text in ["Tent", "Kayak", "Stove"] {
        let req = test::TestRequest::post()
            .uri("/requests")
            .insert_header((SHARER_USER_ID, bob.id.to_string()))
            .set_json(json!({"description": text}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/requests/all?from=0&size=10")
        .insert_header((SHARER_USER_ID, ann.id.to_string()))
        .to_request();
    let all: Value = test::call_and_read_body_json(&app, req).await;
    let all = ids(&all);
    assert_eq!(all.len(), 3);

    let req = test::TestRequest::get()
        .uri("/requests/all?from=1&size=2")
        .insert_header((SHARER_USER_ID, ann.id.to_string()))
        .to_request();
    let first_page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(&first_page), all[..2].to_vec());

    let req = test::TestRequest::get()
        .uri("/requests/all?from=3&size=2")
        .insert_header((SHARER_USER_ID, ann.id.to_string()))
        .to_request();
    let second_page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids(&second_page), all[2..].to_vec());
}
