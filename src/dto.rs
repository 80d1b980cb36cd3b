//! Wire types shared by the server and the gateway.

use chrono::NaiveDateTime;
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    booking::Page,
    errors::{AppError, AppResult},
    projector::ItemView,
    repository::{ItemPatch, NewUser, UserPatch},
    requests::ResolvedRequest,
    structs::{Booking, BookingState, BookingStatus, Comment, Item},
};

#[allow(clippy::ptr_arg)]
fn not_blank(value: &String, _: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("must not be blank"));
    }
    Ok(())
}

fn default_size() -> i64 {
    20
}

/// Window for page-indexed listings: `from` selects the page `from / size`.
fn aligned_page(from: i64, size: i64) -> Page {
    Page {
        offset: from.checked_div(size).unwrap_or(0) * size,
        limit: size,
    }
}

// ---------------------------------------------------------------------------
// requests

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub item_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl CreateBookingRequest {
    /// Both ends in the present or future, `end` strictly after `start`.
    pub fn check_window(&self, now: NaiveDateTime) -> AppResult<()> {
        if self.start < now || self.end < now {
            return Err(AppError::Validation(
                "Booking window must not be in the past".into(),
            ));
        }
        if self.end <= self.start {
            return Err(AppError::Validation(
                "Booking end must be after its start".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApprovalQuery {
    pub approved: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PageQuery {
    #[serde(default)]
    #[garde(range(min = 0))]
    pub from: i64,
    #[serde(default = "default_size")]
    #[garde(range(min = 1, max = 50))]
    pub size: i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            from: 0,
            size: default_size(),
        }
    }
}

impl PageQuery {
    pub fn page_aligned(&self) -> Page {
        aligned_page(self.from, self.size)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct BookingListQuery {
    #[serde(default)]
    #[garde(skip)]
    pub state: BookingState,
    #[serde(default)]
    #[garde(range(min = 0))]
    pub from: i64,
    #[serde(default = "default_size")]
    #[garde(range(min = 1, max = 50))]
    pub size: i64,
}

impl BookingListQuery {
    pub fn page(&self) -> Page {
        Page {
            offset: self.from,
            limit: self.size,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SearchQuery {
    #[garde(skip)]
    pub text: String,
    #[serde(default)]
    #[garde(range(min = 0))]
    pub from: i64,
    #[serde(default = "default_size")]
    #[garde(range(min = 1, max = 50))]
    pub size: i64,
}

impl SearchQuery {
    pub fn page_aligned(&self) -> Page {
        aligned_page(self.from, self.size)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateUserRequest {
    #[garde(custom(not_blank))]
    pub name: String,
    #[garde(email)]
    pub email: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            name: req.name,
            email: req.email,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(email)]
    pub email: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        UserPatch {
            name: req.name,
            email: req.email,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[garde(custom(not_blank))]
    pub name: String,
    #[garde(custom(not_blank))]
    pub description: String,
    #[serde(default)]
    #[garde(required)]
    pub available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub request_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UpdateItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(skip)]
    pub available: Option<bool>,
}

impl From<UpdateItemRequest> for ItemPatch {
    fn from(req: UpdateItemRequest) -> Self {
        ItemPatch {
            name: req.name,
            description: req.description,
            available: req.available,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateCommentRequest {
    #[garde(custom(not_blank))]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateItemRequestRequest {
    #[garde(custom(not_blank))]
    pub description: String,
}

// ---------------------------------------------------------------------------
// responses

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookerResponse {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    pub booker: BookerResponse,
    pub item: ItemResponse,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            start: booking.start,
            end: booking.end,
            status: booking.status,
            booker: BookerResponse {
                id: booking.booker.id,
                name: booking.booker.name,
            },
            item: booking.item.into(),
        }
    }
}

/// Booking as shown inside an owner's item view.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingShortResponse {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub booker_id: i64,
}

impl From<Booking> for BookingShortResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            start: booking.start,
            end: booking.end,
            booker_id: booking.booker.id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: i64,
    pub text: String,
    pub author_name: String,
    pub created: NaiveDateTime,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            text: comment.text,
            author_name: comment.author_name,
            created: comment.created,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemWithBookingsResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
    pub last_booking: Option<BookingShortResponse>,
    pub next_booking: Option<BookingShortResponse>,
    pub comments: Vec<CommentResponse>,
}

impl From<ItemView> for ItemWithBookingsResponse {
    fn from(view: ItemView) -> Self {
        let ItemView {
            item,
            availability,
            comments,
        } = view;
        let (last_booking, next_booking) = availability
            .map(|a| (a.last_booking, a.next_booking))
            .unwrap_or_default();
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
            last_booking: last_booking.map(Into::into),
            next_booking: next_booking.map(Into::into),
            comments: comments.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestItemResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
    pub owner_id: i64,
}

impl From<Item> for RequestItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            available: item.available,
            request_id: item.request_id,
            owner_id: item.owner_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemRequestResponse {
    pub id: i64,
    pub description: String,
    pub created: NaiveDateTime,
    pub items: Vec<RequestItemResponse>,
}

impl From<ResolvedRequest> for ItemRequestResponse {
    fn from(resolved: ResolvedRequest) -> Self {
        Self {
            id: resolved.request.id,
            description: resolved.request.description,
            created: resolved.request.created,
            items: resolved.items.into_iter().map(Into::into).collect(),
        }
    }
}
