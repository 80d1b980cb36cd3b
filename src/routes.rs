use actix_web::{
    delete, get,
    http::Method,
    patch, post,
    web::{self, Data},
    HttpResponse, Responder,
};

use crate::{
    booking,
    dto::{
        ApprovalQuery, BookingListQuery, BookingResponse, CommentResponse, CreateBookingRequest,
        CreateCommentRequest, CreateItemRequest, CreateItemRequestRequest, CreateUserRequest,
        ItemRequestResponse, ItemResponse, ItemWithBookingsResponse, PageQuery, SearchQuery,
        UpdateItemRequest, UpdateUserRequest,
    },
    errors::{AppError, AppResult, ErrorResponse},
    extract::SharerUserId,
    items, now, requests, users, AppState,
};

/// Registers every backend route. Literal segments come before `{id}` ones.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(create_booking_handler)
        .service(list_owner_bookings_handler)
        .service(list_author_bookings_handler)
        .service(get_booking_handler)
        .service(approve_booking_handler)
        .service(list_items_handler)
        .service(search_items_handler)
        .service(get_item_handler)
        .service(create_item_handler)
        .service(update_item_handler)
        .service(create_comment_handler)
        .service(list_users_handler)
        .service(get_user_handler)
        .service(create_user_handler)
        .service(update_user_handler)
        .service(delete_user_handler)
        .service(create_request_handler)
        .service(list_other_requests_handler)
        .service(list_own_requests_handler)
        .service(get_request_handler);
}

pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _| {
        AppError::Validation(format!("Error validation Data: {err}")).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _| {
        let message = match err {
            actix_web::error::QueryPayloadError::Deserialize(e) => e.to_string(),
            other => other.to_string(),
        };
        AppError::Validation(message).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _| AppError::Validation(err.to_string()).into())
}

/// Fallback for unmatched routes: 404 for GET, 405 otherwise.
pub async fn default_handler(method: Method) -> HttpResponse {
    match method {
        Method::GET => HttpResponse::NotFound().json(ErrorResponse {
            error: "Not found".into(),
        }),
        _ => HttpResponse::MethodNotAllowed().finish(),
    }
}

// ---------------------------------------------------------------------------
// bookings

#[post("/bookings")]
pub async fn create_booking_handler(
    state: Data<AppState>,
    user: SharerUserId,
    web::Json(req): web::Json<CreateBookingRequest>,
) -> AppResult<impl Responder> {
    let booking =
        booking::create_booking(&state, user.id(), req.item_id, req.start, req.end).await?;
    Ok(HttpResponse::Ok().json(BookingResponse::from(booking)))
}

#[patch("/bookings/{booking_id}")]
pub async fn approve_booking_handler(
    state: Data<AppState>,
    user: SharerUserId,
    path: web::Path<i64>,
    query: web::Query<ApprovalQuery>,
) -> AppResult<impl Responder> {
    let booking =
        booking::set_approval(&state, path.into_inner(), user.id(), query.approved).await?;
    Ok(HttpResponse::Ok().json(BookingResponse::from(booking)))
}

#[get("/bookings/owner")]
pub async fn list_owner_bookings_handler(
    state: Data<AppState>,
    user: SharerUserId,
    query: web::Query<BookingListQuery>,
) -> AppResult<impl Responder> {
    let bookings =
        booking::list_by_owner(&state, user.id(), query.state, query.page(), now()).await?;
    Ok(HttpResponse::Ok().json(to_responses::<_, BookingResponse>(bookings)))
}

#[get("/bookings")]
pub async fn list_author_bookings_handler(
    state: Data<AppState>,
    user: SharerUserId,
    query: web::Query<BookingListQuery>,
) -> AppResult<impl Responder> {
    let bookings =
        booking::list_by_author(&state, user.id(), query.state, query.page(), now()).await?;
    Ok(HttpResponse::Ok().json(to_responses::<_, BookingResponse>(bookings)))
}

#[get("/bookings/{booking_id}")]
pub async fn get_booking_handler(
    state: Data<AppState>,
    user: SharerUserId,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let booking = booking::get_booking_details(&state, path.into_inner(), user.id()).await?;
    Ok(HttpResponse::Ok().json(BookingResponse::from(booking)))
}

// ---------------------------------------------------------------------------
// items

#[get("/items")]
pub async fn list_items_handler(
    state: Data<AppState>,
    user: SharerUserId,
    query: web::Query<PageQuery>,
) -> AppResult<impl Responder> {
    let views = items::get_owner_items(&state, user.id(), query.page_aligned(), now()).await?;
    Ok(HttpResponse::Ok().json(to_responses::<_, ItemWithBookingsResponse>(views)))
}

#[get("/items/search")]
pub async fn search_items_handler(
    state: Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<impl Responder> {
    let found = items::search_items(&state, &query.text, query.page_aligned()).await?;
    Ok(HttpResponse::Ok().json(to_responses::<_, ItemResponse>(found)))
}

#[get("/items/{item_id}")]
pub async fn get_item_handler(
    state: Data<AppState>,
    user: SharerUserId,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let view = items::get_item(&state, path.into_inner(), user.id(), now()).await?;
    Ok(HttpResponse::Ok().json(ItemWithBookingsResponse::from(view)))
}

#[post("/items")]
pub async fn create_item_handler(
    state: Data<AppState>,
    user: SharerUserId,
    web::Json(req): web::Json<CreateItemRequest>,
) -> AppResult<impl Responder> {
    let available = req
        .available
        .ok_or_else(|| AppError::Validation("available: not set".into()))?;
    let item = items::create_item(
        &state,
        user.id(),
        req.name,
        req.description,
        available,
        req.request_id,
    )
    .await?;
    Ok(HttpResponse::Ok().json(ItemResponse::from(item)))
}

#[patch("/items/{item_id}")]
pub async fn update_item_handler(
    state: Data<AppState>,
    user: SharerUserId,
    path: web::Path<i64>,
    web::Json(req): web::Json<UpdateItemRequest>,
) -> AppResult<impl Responder> {
    let item = items::update_item(&state, user.id(), path.into_inner(), req.into()).await?;
    Ok(HttpResponse::Ok().json(ItemResponse::from(item)))
}

#[post("/items/{item_id}/comment")]
pub async fn create_comment_handler(
    state: Data<AppState>,
    user: SharerUserId,
    path: web::Path<i64>,
    web::Json(req): web::Json<CreateCommentRequest>,
) -> AppResult<impl Responder> {
    let comment =
        items::create_comment(&state, user.id(), path.into_inner(), req.text, now()).await?;
    Ok(HttpResponse::Ok().json(CommentResponse::from(comment)))
}

// ---------------------------------------------------------------------------
// users

#[get("/users")]
pub async fn list_users_handler(state: Data<AppState>) -> AppResult<impl Responder> {
    Ok(HttpResponse::Ok().json(users::get_users(&state).await?))
}

#[get("/users/{user_id}")]
pub async fn get_user_handler(
    state: Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    Ok(HttpResponse::Ok().json(users::find_user(&state, path.into_inner()).await?))
}

#[post("/users")]
pub async fn create_user_handler(
    state: Data<AppState>,
    web::Json(req): web::Json<CreateUserRequest>,
) -> AppResult<impl Responder> {
    Ok(HttpResponse::Ok().json(users::create_user(&state, req.into()).await?))
}

#[patch("/users/{user_id}")]
pub async fn update_user_handler(
    state: Data<AppState>,
    path: web::Path<i64>,
    web::Json(req): web::Json<UpdateUserRequest>,
) -> AppResult<impl Responder> {
    let user = users::update_user(&state, path.into_inner(), req.into()).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[delete("/users/{user_id}")]
pub async fn delete_user_handler(
    state: Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    users::delete_user(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().finish())
}

// ---------------------------------------------------------------------------
// item requests

#[post("/requests")]
pub async fn create_request_handler(
    state: Data<AppState>,
    user: SharerUserId,
    web::Json(req): web::Json<CreateItemRequestRequest>,
) -> AppResult<impl Responder> {
    let request = requests::create_request(&state, user.id(), req.description, now()).await?;
    Ok(HttpResponse::Ok().json(ItemRequestResponse::from(request)))
}

#[get("/requests/all")]
pub async fn list_other_requests_handler(
    state: Data<AppState>,
    user: SharerUserId,
    query: web::Query<PageQuery>,
) -> AppResult<impl Responder> {
    let found = requests::get_other_requests(&state, user.id(), query.page_aligned()).await?;
    Ok(HttpResponse::Ok().json(to_responses::<_, ItemRequestResponse>(found)))
}

#[get("/requests")]
pub async fn list_own_requests_handler(
    state: Data<AppState>,
    user: SharerUserId,
) -> AppResult<impl Responder> {
    let found = requests::get_own_requests(&state, user.id()).await?;
    Ok(HttpResponse::Ok().json(to_responses::<_, ItemRequestResponse>(found)))
}

#[get("/requests/{request_id}")]
pub async fn get_request_handler(
    state: Data<AppState>,
    user: SharerUserId,
    path: web::Path<i64>,
) -> AppResult<impl Responder> {
    let request = requests::get_request(&state, user.id(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ItemRequestResponse::from(request)))
}

fn to_responses<T, R: From<T>>(values: Vec<T>) -> Vec<R> {
    values.into_iter().map(R::from).collect()
}
