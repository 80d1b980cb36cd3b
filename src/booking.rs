//! Booking lifecycle: creation, owner approval, guarded reads and state-filtered listing.

use chrono::NaiveDateTime;

use crate::{
    errors::{AppError, AppResult},
    repository::NewBooking,
    structs::{Booking, BookingState, BookingStatus},
    users::ensure_user_exists,
    AppState,
};

/// One page window. Listing applies the state filter inside the page, after paging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
        }
    }
}

pub async fn create_booking(
    state: &AppState,
    requester_id: i64,
    item_id: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> AppResult<Booking> {
    let item = state
        .items
        .find_by_id(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Item with id {item_id} not found")))?;
    ensure_user_exists(state, requester_id).await?;

    if !item.available {
        log::warn!("Item {} not available for booking", item.id);
        return Err(AppError::InvalidState("item not available".into()));
    }
    if item.owner_id == requester_id {
        log::warn!("Owner {} tried to book own item {}", requester_id, item.id);
        return Err(AppError::Forbidden("owner cannot book own item".into()));
    }

    state
        .bookings
        .create(NewBooking {
            item_id,
            booker_id: requester_id,
            start,
            end,
        })
        .await
}

pub async fn set_approval(
    state: &AppState,
    booking_id: i64,
    acting_user_id: i64,
    approved: bool,
) -> AppResult<Booking> {
    let mut booking = find_booking(state, booking_id).await?;
    if booking.item.owner_id != acting_user_id {
        log::warn!(
            "User {} is not the owner of the item booked by {}",
            acting_user_id,
            booking_id
        );
        return Err(AppError::Forbidden(
            "Only the owner of the item can confirm the booking".into(),
        ));
    }

    let target = if approved {
        BookingStatus::Approved
    } else {
        BookingStatus::Rejected
    };
    if booking.status == target {
        return Err(already(target));
    }

    // The write only lands if the status is still the one the guard saw, so two
    // concurrent identical decisions cannot both succeed.
    while !state
        .bookings
        .compare_and_set_status(booking_id, booking.status, target)
        .await?
    {
        booking = find_booking(state, booking_id).await?;
        log::warn!(
            "Booking {} changed concurrently to {}",
            booking_id,
            booking.status.as_str()
        );
        if booking.status == target {
            return Err(already(target));
        }
    }

    log::info!("Booking {} set to {}", booking_id, target.as_str());
    booking.status = target;
    Ok(booking)
}

pub async fn get_booking_details(
    state: &AppState,
    booking_id: i64,
    acting_user_id: i64,
) -> AppResult<Booking> {
    ensure_user_exists(state, acting_user_id).await?;
    let booking = find_booking(state, booking_id).await?;
    if acting_user_id != booking.booker.id && acting_user_id != booking.item.owner_id {
        log::warn!(
            "User {} is neither booker nor owner of booking {}",
            acting_user_id,
            booking_id
        );
        return Err(AppError::Forbidden(
            "Only the author or owner can check booking details".into(),
        ));
    }
    Ok(booking)
}

pub async fn list_by_author(
    state: &AppState,
    acting_user_id: i64,
    filter: BookingState,
    page: Page,
    now: NaiveDateTime,
) -> AppResult<Vec<Booking>> {
    ensure_user_exists(state, acting_user_id).await?;
    let bookings = state
        .bookings
        .find_by_booker(acting_user_id, page.offset, page.limit)
        .await?;
    Ok(filter_by_state(bookings, filter, now))
}

pub async fn list_by_owner(
    state: &AppState,
    acting_user_id: i64,
    filter: BookingState,
    page: Page,
    now: NaiveDateTime,
) -> AppResult<Vec<Booking>> {
    ensure_user_exists(state, acting_user_id).await?;
    if state.bookings.count_by_item_owner(acting_user_id).await? == 0 {
        log::warn!("User {} has no booked item", acting_user_id);
        return Err(AppError::NotFound("this user has no item".into()));
    }
    let bookings = state
        .bookings
        .find_by_item_owner(acting_user_id, page.offset, page.limit)
        .await?;
    Ok(filter_by_state(bookings, filter, now))
}

pub fn filter_by_state(
    bookings: Vec<Booking>,
    filter: BookingState,
    now: NaiveDateTime,
) -> Vec<Booking> {
    bookings
        .into_iter()
        .filter(|booking| filter.matches(booking, now))
        .collect()
}

async fn find_booking(state: &AppState, booking_id: i64) -> AppResult<Booking> {
    state
        .bookings
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".into()))
}

fn already(status: BookingStatus) -> AppError {
    let message = format!("Status already: {}", status.as_str().to_lowercase());
    log::info!("{}", message);
    AppError::InvalidState(message)
}
