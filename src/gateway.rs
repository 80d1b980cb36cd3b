//! Validating front tier. Requests are checked for shape and ranges, then
//! relayed unchanged to the backend; the backend's status and body are passed
//! back to the client as-is.

use actix_web::{
    delete, get,
    http::{header::CONTENT_TYPE, StatusCode},
    patch, post,
    web::{self, Data},
    HttpRequest, HttpResponse,
};
use garde::Validate;
use serde::Serialize;

use crate::{
    dto::{
        ApprovalQuery, BookingListQuery, CreateBookingRequest, CreateCommentRequest,
        CreateItemRequest, CreateItemRequestRequest, CreateUserRequest, PageQuery, SearchQuery,
        UpdateItemRequest, UpdateUserRequest,
    },
    errors::AppResult,
    extract::{SharerUserId, SHARER_USER_ID},
    now,
    routes::{json_config, path_config, query_config},
};

#[derive(Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    base_url: String,
}

impl Forwarder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn request(&self, req: &HttpRequest, user: Option<SharerUserId>) -> reqwest::RequestBuilder {
        let mut url = format!("{}{}", self.base_url, req.path());
        if !req.query_string().is_empty() {
            url.push('?');
            url.push_str(req.query_string());
        }
        let method = reqwest::Method::from_bytes(req.method().as_str().as_bytes())
            .unwrap_or(reqwest::Method::GET);
        let mut builder = self.client.request(method, url);
        if let Some(user) = user {
            builder = builder.header(SHARER_USER_ID, user.id().to_string());
        }
        builder
    }

    pub async fn forward(
        &self,
        req: &HttpRequest,
        user: Option<SharerUserId>,
    ) -> AppResult<HttpResponse> {
        relay(self.request(req, user)).await
    }

    pub async fn forward_json<B: Serialize + ?Sized>(
        &self,
        req: &HttpRequest,
        user: Option<SharerUserId>,
        body: &B,
    ) -> AppResult<HttpResponse> {
        relay(self.request(req, user).json(body)).await
    }
}

async fn relay(builder: reqwest::RequestBuilder) -> AppResult<HttpResponse> {
    let response = builder.send().await?;
    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body = response.bytes().await?;
    log::debug!("Backend answered {} ({} bytes)", status, body.len());

    let mut relayed = HttpResponse::build(status);
    if let Some(content_type) = content_type {
        relayed.insert_header((CONTENT_TYPE, content_type));
    }
    Ok(relayed.body(body))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(create_booking)
        .service(list_owner_bookings)
        .service(list_author_bookings)
        .service(get_booking)
        .service(approve_booking)
        .service(list_items)
        .service(search_items)
        .service(get_item)
        .service(create_item)
        .service(update_item)
        .service(create_comment)
        .service(list_users)
        .service(get_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user)
        .service(create_request)
        .service(list_other_requests)
        .service(list_own_requests)
        .service(get_request);
}

// ---------------------------------------------------------------------------
// bookings

#[post("/bookings")]
async fn create_booking(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    web::Json(body): web::Json<CreateBookingRequest>,
) -> AppResult<HttpResponse> {
    body.check_window(now())?;
    log::info!("Creating booking {:?}, userId={}", body, user.id());
    forwarder.forward_json(&req, Some(user), &body).await
}

#[patch("/bookings/{booking_id}")]
async fn approve_booking(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    path: web::Path<i64>,
    query: web::Query<ApprovalQuery>,
) -> AppResult<HttpResponse> {
    log::info!(
        "Update booking {}, userId={}, approved={}",
        path.into_inner(),
        user.id(),
        query.approved
    );
    forwarder.forward(&req, Some(user)).await
}

#[get("/bookings/owner")]
async fn list_owner_bookings(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    query: web::Query<BookingListQuery>,
) -> AppResult<HttpResponse> {
    query.validate()?;
    log::info!(
        "Get owner bookings with state {}, userId={}, from={}, size={}",
        query.state,
        user.id(),
        query.from,
        query.size
    );
    forwarder.forward(&req, Some(user)).await
}

#[get("/bookings")]
async fn list_author_bookings(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    query: web::Query<BookingListQuery>,
) -> AppResult<HttpResponse> {
    query.validate()?;
    log::info!(
        "Get booking with state {}, userId={}, from={}, size={}",
        query.state,
        user.id(),
        query.from,
        query.size
    );
    forwarder.forward(&req, Some(user)).await
}

#[get("/bookings/{booking_id}")]
async fn get_booking(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    log::info!("Get booking {}, userId={}", path.into_inner(), user.id());
    forwarder.forward(&req, Some(user)).await
}

// ---------------------------------------------------------------------------
// items

#[get("/items")]
async fn list_items(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    query.validate()?;
    forwarder.forward(&req, Some(user)).await
}

#[get("/items/search")]
async fn search_items(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    query.validate()?;
    log::info!(
        "Get items with text {}, from={}, size={}",
        query.text,
        query.from,
        query.size
    );
    forwarder.forward(&req, None).await
}

#[get("/items/{item_id}")]
async fn get_item(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    _path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    forwarder.forward(&req, Some(user)).await
}

#[post("/items")]
async fn create_item(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    web::Json(body): web::Json<CreateItemRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    log::info!("Create item {:?}", body);
    forwarder.forward_json(&req, Some(user), &body).await
}

#[patch("/items/{item_id}")]
async fn update_item(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    _path: web::Path<i64>,
    web::Json(body): web::Json<UpdateItemRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    log::info!("Update item {:?}", body);
    forwarder.forward_json(&req, Some(user), &body).await
}

#[post("/items/{item_id}/comment")]
async fn create_comment(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    path: web::Path<i64>,
    web::Json(body): web::Json<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    log::info!("Create comment for item with id {}", path.into_inner());
    forwarder.forward_json(&req, Some(user), &body).await
}

// ---------------------------------------------------------------------------
// users

#[get("/users")]
async fn list_users(req: HttpRequest, forwarder: Data<Forwarder>) -> AppResult<HttpResponse> {
    log::info!("Get users list");
    forwarder.forward(&req, None).await
}

#[get("/users/{user_id}")]
async fn get_user(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    log::info!("Get user {}", path.into_inner());
    forwarder.forward(&req, None).await
}

#[post("/users")]
async fn create_user(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    web::Json(body): web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    log::info!("Create user {:?}", body);
    forwarder.forward_json(&req, None, &body).await
}

#[patch("/users/{user_id}")]
async fn update_user(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    path: web::Path<i64>,
    web::Json(body): web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    log::info!("Update user {} with {:?}", path.into_inner(), body);
    forwarder.forward_json(&req, None, &body).await
}

#[delete("/users/{user_id}")]
async fn delete_user(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    log::info!("Delete user {}", path.into_inner());
    forwarder.forward(&req, None).await
}

// ---------------------------------------------------------------------------
// item requests

#[post("/requests")]
async fn create_request(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    web::Json(body): web::Json<CreateItemRequestRequest>,
) -> AppResult<HttpResponse> {
    body.validate()?;
    log::info!("Create item request {:?}, userId={}", body, user.id());
    forwarder.forward_json(&req, Some(user), &body).await
}

#[get("/requests/all")]
async fn list_other_requests(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    query.validate()?;
    log::info!(
        "Get requests of other users for {}, from={}, size={}",
        user.id(),
        query.from,
        query.size
    );
    forwarder.forward(&req, Some(user)).await
}

#[get("/requests")]
async fn list_own_requests(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
) -> AppResult<HttpResponse> {
    log::info!("Get all item requests of {}", user.id());
    forwarder.forward(&req, Some(user)).await
}

#[get("/requests/{request_id}")]
async fn get_request(
    req: HttpRequest,
    forwarder: Data<Forwarder>,
    user: SharerUserId,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    log::info!("Get item request {}", path.into_inner());
    forwarder.forward(&req, Some(user)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use chrono::Duration;

    // Nothing listens on this port; every test here must be rejected before forwarding.
    fn forwarder() -> Data<Forwarder> {
        Data::new(Forwarder::new("http://127.0.0.1:9"))
    }

    #[actix_web::test]
    async fn rejects_missing_user_header() {
        let app =
            test::init_service(App::new().app_data(forwarder()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/bookings").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn rejects_unknown_state() {
        let app =
            test::init_service(App::new().app_data(forwarder()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/bookings?state=UNSUPPORTED_STATUS")
            .insert_header((SHARER_USER_ID, "1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unknown state: UNSUPPORTED_STATUS");
    }

    #[actix_web::test]
    async fn rejects_page_size_out_of_range() {
        let app =
            test::init_service(App::new().app_data(forwarder()).configure(configure)).await;
        for uri in ["/bookings/owner?size=0", "/items?size=51", "/requests/all?from=-1"] {
            let req = test::TestRequest::get()
                .uri(uri)
                .insert_header((SHARER_USER_ID, "1"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[actix_web::test]
    async fn rejects_booking_window_ending_before_start() {
        let app =
            test::init_service(App::new().app_data(forwarder()).configure(configure)).await;
        let start = now() + Duration::days(2);
        let req = test::TestRequest::post()
            .uri("/bookings")
            .insert_header((SHARER_USER_ID, "1"))
            .set_json(CreateBookingRequest {
                item_id: 1,
                start,
                end: start - Duration::hours(1),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn rejects_booking_in_the_past() {
        let app =
            test::init_service(App::new().app_data(forwarder()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/bookings")
            .insert_header((SHARER_USER_ID, "1"))
            .set_json(CreateBookingRequest {
                item_id: 1,
                start: now() - Duration::days(2),
                end: now() + Duration::days(1),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn rejects_invalid_user_email() {
        let app =
            test::init_service(App::new().app_data(forwarder()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(serde_json::json!({"name": "Ann", "email": "ann-at-example"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn rejects_blank_comment() {
        let app =
            test::init_service(App::new().app_data(forwarder()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/items/4/comment")
            .insert_header((SHARER_USER_ID, "1"))
            .set_json(serde_json::json!({"text": "   "}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn rejects_search_without_text() {
        let app =
            test::init_service(App::new().app_data(forwarder()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/items/search?from=0&size=10")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unreachable_backend_is_an_internal_error() {
        let app =
            test::init_service(App::new().app_data(forwarder()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/users").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "An unexpected error has occurred.");
    }
}
