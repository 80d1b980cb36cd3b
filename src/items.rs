use chrono::NaiveDateTime;

use crate::{
    booking::Page,
    errors::{AppError, AppResult},
    projector::{view_item, ItemView},
    repository::{ItemPatch, NewComment, NewItem},
    structs::{BookingStatus, Comment, Item},
    users::ensure_user_exists,
    AppState,
};

pub async fn create_item(
    state: &AppState,
    owner_id: i64,
    name: String,
    description: String,
    available: bool,
    request_id: Option<i64>,
) -> AppResult<Item> {
    ensure_user_exists(state, owner_id).await?;
    if let Some(request_id) = request_id {
        state
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item request {request_id} not found")))?;
    }
    state
        .items
        .create(NewItem {
            name,
            description,
            available,
            owner_id,
            request_id,
        })
        .await
}

pub async fn update_item(
    state: &AppState,
    user_id: i64,
    item_id: i64,
    patch: ItemPatch,
) -> AppResult<Item> {
    let item = find_item(state, item_id).await?;
    ensure_user_exists(state, user_id).await?;
    if item.owner_id != user_id {
        log::warn!("User {} is not the owner of item {}", user_id, item_id);
        return Err(AppError::Forbidden(
            "Only the owner can update the item".into(),
        ));
    }
    state
        .items
        .update(item_id, patch)
        .await?
        .ok_or_else(|| item_not_found(item_id))
}

pub async fn get_item(
    state: &AppState,
    item_id: i64,
    viewer_id: i64,
    now: NaiveDateTime,
) -> AppResult<ItemView> {
    let item = find_item(state, item_id).await?;
    view_item(state, item, viewer_id, now).await
}

pub async fn get_owner_items(
    state: &AppState,
    owner_id: i64,
    page: Page,
    now: NaiveDateTime,
) -> AppResult<Vec<ItemView>> {
    let items = state
        .items
        .find_by_owner(owner_id, page.offset, page.limit)
        .await?;
    let mut views = Vec::with_capacity(items.len());
    for item in items {
        views.push(view_item(state, item, owner_id, now).await?);
    }
    Ok(views)
}

pub async fn search_items(state: &AppState, text: &str, page: Page) -> AppResult<Vec<Item>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    state.items.search(text, page.offset, page.limit).await
}

/// Only a past renter may comment: the author needs an approved booking of
/// this item that ended before `now`.
pub async fn create_comment(
    state: &AppState,
    user_id: i64,
    item_id: i64,
    text: String,
    now: NaiveDateTime,
) -> AppResult<Comment> {
    let eligible = state
        .bookings
        .find_all_by_booker(user_id)
        .await?
        .iter()
        .filter(|b| b.status == BookingStatus::Approved)
        .filter(|b| b.end < now)
        .any(|b| b.item.id == item_id);
    if !eligible {
        log::error!("Could not find item {} for renter {}", item_id, user_id);
        return Err(AppError::InvalidState(
            "no eligible completed rental found".into(),
        ));
    }

    state
        .comments
        .create(NewComment {
            text,
            item_id,
            author_id: user_id,
            created: now,
        })
        .await
}

async fn find_item(state: &AppState, item_id: i64) -> AppResult<Item> {
    state
        .items
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| item_not_found(item_id))
}

fn item_not_found(item_id: i64) -> AppError {
    AppError::NotFound(format!("Item with id {item_id} not found"))
}
