use std::sync::Arc;

use chrono::NaiveDateTime;
use sqlx::SqlitePool;

pub mod booking;
pub mod config;
pub mod db;
pub mod dto;
pub mod errors;
pub mod extract;
pub mod gateway;
pub mod items;
pub mod projector;
pub mod repository;
pub mod requests;
pub mod routes;
pub mod structs;
pub mod users;

use db::{
    SqliteBookingRepository, SqliteCommentRepository, SqliteItemRepository,
    SqliteItemRequestRepository, SqliteUserRepository,
};
use repository::{
    BookingRepository, CommentRepository, ItemRepository, ItemRequestRepository, UserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub requests: Arc<dyn ItemRequestRepository>,
}

impl AppState {
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            users: Arc::new(SqliteUserRepository::new(pool.clone())),
            items: Arc::new(SqliteItemRepository::new(pool.clone())),
            bookings: Arc::new(SqliteBookingRepository::new(pool.clone())),
            comments: Arc::new(SqliteCommentRepository::new(pool.clone())),
            requests: Arc::new(SqliteItemRequestRepository::new(pool)),
        }
    }
}

/// Wall-clock "now" for every temporal check, read at call time.
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}
