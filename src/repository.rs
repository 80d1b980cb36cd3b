//! Storage ports. Services only reach persisted state through these traits;
//! `db` provides the SQLite implementations.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{
    errors::AppResult,
    structs::{Booking, BookingStatus, Comment, Item, ItemRequest, User},
};

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Unset fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

/// Unset fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub item_id: i64,
    pub booker_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub text: String,
    pub item_id: i64,
    pub author_id: i64,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewItemRequest {
    pub description: String,
    pub requester_id: i64,
    pub created: NaiveDateTime,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<User>>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;
    async fn create(&self, user: NewUser) -> AppResult<User>;
    /// `None` when no user has this id.
    async fn update(&self, id: i64, patch: UserPatch) -> AppResult<Option<User>>;
    /// `false` when no user has this id.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn create(&self, item: NewItem) -> AppResult<Item>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Item>>;
    async fn update(&self, id: i64, patch: ItemPatch) -> AppResult<Option<Item>>;
    /// Owner's items ordered by id ascending.
    async fn find_by_owner(&self, owner_id: i64, offset: i64, limit: i64) -> AppResult<Vec<Item>>;
    /// Available items whose name or description contains `text`, case-insensitively.
    async fn search(&self, text: &str, offset: i64, limit: i64) -> AppResult<Vec<Item>>;
    async fn find_by_request(&self, request_id: i64) -> AppResult<Vec<Item>>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Stores the booking in `WAITING`.
    async fn create(&self, booking: NewBooking) -> AppResult<Booking>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Booking>>;
    /// Atomically moves `id` from `expected` to `status`. Returns `false` if the
    /// stored status was no longer `expected`.
    async fn compare_and_set_status(
        &self,
        id: i64,
        expected: BookingStatus,
        status: BookingStatus,
    ) -> AppResult<bool>;
    /// Booker's bookings, `start` descending, one page.
    async fn find_by_booker(&self, booker_id: i64, offset: i64, limit: i64)
        -> AppResult<Vec<Booking>>;
    /// Every booking of the booker ordered by id.
    async fn find_all_by_booker(&self, booker_id: i64) -> AppResult<Vec<Booking>>;
    /// Bookings on items owned by `owner_id`, `start` descending, one page.
    async fn find_by_item_owner(
        &self,
        owner_id: i64,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<Booking>>;
    async fn count_by_item_owner(&self, owner_id: i64) -> AppResult<i64>;
    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<Booking>>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, comment: NewComment) -> AppResult<Comment>;
    async fn find_by_item(&self, item_id: i64) -> AppResult<Vec<Comment>>;
}

#[async_trait]
pub trait ItemRequestRepository: Send + Sync {
    async fn create(&self, request: NewItemRequest) -> AppResult<ItemRequest>;
    async fn find_by_id(&self, id: i64) -> AppResult<Option<ItemRequest>>;
    /// Requester's own requests, newest first.
    async fn find_by_requester(&self, requester_id: i64) -> AppResult<Vec<ItemRequest>>;
    /// Requests of everyone but `requester_id`, newest first, one page.
    async fn find_by_other_requesters(
        &self,
        requester_id: i64,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<ItemRequest>>;
}
