use chrono::NaiveDateTime;

use crate::{
    booking::Page,
    errors::{AppError, AppResult},
    repository::NewItemRequest,
    structs::{Item, ItemRequest},
    users::ensure_user_exists,
    AppState,
};

/// A request together with the catalog items listed in response to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub request: ItemRequest,
    pub items: Vec<Item>,
}

pub async fn create_request(
    state: &AppState,
    requester_id: i64,
    description: String,
    now: NaiveDateTime,
) -> AppResult<ResolvedRequest> {
    ensure_user_exists(state, requester_id).await?;
    let request = state
        .requests
        .create(NewItemRequest {
            description,
            requester_id,
            created: now,
        })
        .await?;
    Ok(ResolvedRequest {
        request,
        items: Vec::new(),
    })
}

pub async fn get_own_requests(
    state: &AppState,
    requester_id: i64,
) -> AppResult<Vec<ResolvedRequest>> {
    ensure_user_exists(state, requester_id).await?;
    let requests = state.requests.find_by_requester(requester_id).await?;
    resolve_all(state, requests).await
}

pub async fn get_other_requests(
    state: &AppState,
    user_id: i64,
    page: Page,
) -> AppResult<Vec<ResolvedRequest>> {
    ensure_user_exists(state, user_id).await?;
    let requests = state
        .requests
        .find_by_other_requesters(user_id, page.offset, page.limit)
        .await?;
    resolve_all(state, requests).await
}

pub async fn get_request(
    state: &AppState,
    user_id: i64,
    request_id: i64,
) -> AppResult<ResolvedRequest> {
    ensure_user_exists(state, user_id).await?;
    let request = state
        .requests
        .find_by_id(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item request not found".into()))?;
    resolve(state, request).await
}

async fn resolve(state: &AppState, request: ItemRequest) -> AppResult<ResolvedRequest> {
    let items = state.items.find_by_request(request.id).await?;
    Ok(ResolvedRequest { request, items })
}

async fn resolve_all(
    state: &AppState,
    requests: Vec<ItemRequest>,
) -> AppResult<Vec<ResolvedRequest>> {
    let mut resolved = Vec::with_capacity(requests.len());
    for request in requests {
        resolved.push(resolve(state, request).await?);
    }
    Ok(resolved)
}
