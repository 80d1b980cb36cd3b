#![allow(dead_code)]

use chrono::{Duration, NaiveDateTime};
use shareit::{
    booking, db, items,
    repository::NewUser,
    structs::{Booking, Item, User},
    users, AppState,
};

/// Builds an initialized actix test service over the backend routes.
macro_rules! app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($state.clone()))
                .configure(shareit::routes::configure),
        )
        .await
    };
}

pub async fn state() -> AppState {
    let pool = db::connect_in_memory().await.unwrap();
    AppState::sqlite(pool)
}

pub async fn user(state: &AppState, name: &str) -> User {
    users::create_user(
        state,
        NewUser {
            name: name.to_owned(),
            email: format!("{}@example.com", name.to_lowercase()),
        },
    )
    .await
    .unwrap()
}

pub async fn item(state: &AppState, owner: &User, name: &str, available: bool) -> Item {
    items::create_item(
        state,
        owner.id,
        name.to_owned(),
        format!("{name} for rent"),
        available,
        None,
    )
    .await
    .unwrap()
}

/// Books `item` for `booker` over `[start, end]` without window checks, so
/// windows in the past can be set up directly.
pub async fn book(
    state: &AppState,
    booker: &User,
    item: &Item,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Booking {
    booking::create_booking(state, booker.id, item.id, start, end)
        .await
        .unwrap()
}

pub async fn decide(state: &AppState, owner: &User, booking: &Booking, approved: bool) -> Booking {
    booking::set_approval(state, booking.id, owner.id, approved)
        .await
        .unwrap()
}

pub fn days(n: i64) -> NaiveDateTime {
    shareit::now() + Duration::days(n)
}

pub fn hours(n: i64) -> NaiveDateTime {
    shareit::now() + Duration::hours(n)
}

pub fn ids(body: &serde_json::Value) -> Vec<i64> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_i64().unwrap())
        .collect()
}
