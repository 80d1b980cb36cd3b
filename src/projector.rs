//! Last/next booking per item for owner views.

use chrono::NaiveDateTime;

use crate::{
    errors::AppResult,
    structs::{Booking, Comment, Item},
    AppState,
};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Availability {
    pub last_booking: Option<Booking>,
    pub next_booking: Option<Booking>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub item: Item,
    /// `None` unless the viewer owns the item.
    pub availability: Option<Availability>,
    pub comments: Vec<Comment>,
}

/// Picks the last booking (latest start at or before `now`, longest-running on ties)
/// and the next one (earliest start at or after `now`). Without a last booking
/// neither is reported.
pub fn project(bookings: &[Booking], now: NaiveDateTime) -> Availability {
    let last = bookings
        .iter()
        .filter(|b| b.start <= now)
        .max_by_key(|b| (b.start, b.end));
    let Some(last) = last else {
        return Availability::default();
    };
    let next = bookings
        .iter()
        .filter(|b| b.start >= now)
        .min_by_key(|b| (b.start, b.end));

    Availability {
        last_booking: Some(last.clone()),
        next_booking: next.cloned(),
    }
}

pub async fn project_for_owner_view(
    state: &AppState,
    item: &Item,
    now: NaiveDateTime,
) -> AppResult<Availability> {
    let bookings = state.bookings.find_by_item(item.id).await?;
    Ok(project(&bookings, now))
}

/// Item with its comments, plus the booking projection when `viewer_id` owns it.
pub async fn view_item(
    state: &AppState,
    item: Item,
    viewer_id: i64,
    now: NaiveDateTime,
) -> AppResult<ItemView> {
    let comments = state.comments.find_by_item(item.id).await?;
    let availability = if item.owner_id == viewer_id {
        Some(project_for_owner_view(state, &item, now).await?)
    } else {
        None
    };
    Ok(ItemView {
        item,
        availability,
        comments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::{BookingStatus, User};
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn booking(id: i64, start_h: i64, end_h: i64) -> Booking {
        Booking {
            id,
            start: now() + Duration::hours(start_h),
            end: now() + Duration::hours(end_h),
            status: BookingStatus::Approved,
            item: Item {
                id: 7,
                name: "tent".into(),
                description: "two person".into(),
                available: true,
                owner_id: 1,
                request_id: None,
            },
            booker: User {
                id: 2,
                name: "camper".into(),
                email: "camper@example.com".into(),
            },
        }
    }

    fn ids(availability: &Availability) -> (Option<i64>, Option<i64>) {
        (
            availability.last_booking.as_ref().map(|b| b.id),
            availability.next_booking.as_ref().map(|b| b.id),
        )
    }

    #[test]
    fn no_bookings_means_no_projection() {
        assert_eq!(project(&[], now()), Availability::default());
    }

    #[test]
    fn picks_latest_past_start_and_earliest_future_start() {
        let bookings = vec![
            booking(1, -48, -47),
            booking(2, -5, -4),
            booking(3, 10, 12),
            booking(4, 3, 4),
        ];
        assert_eq!(ids(&project(&bookings, now())), (Some(2), Some(4)));
    }

    #[test]
    fn ties_on_start_prefer_the_later_end() {
        let bookings = vec![booking(1, -5, -4), booking(2, -5, 2)];
        assert_eq!(ids(&project(&bookings, now())), (Some(2), None));
    }

    #[test]
    fn next_is_hidden_when_there_is_no_last() {
        let bookings = vec![booking(1, 2, 3), booking(2, 5, 6)];
        assert_eq!(ids(&project(&bookings, now())), (None, None));
    }

    #[test]
    fn ongoing_booking_counts_as_last() {
        let bookings = vec![booking(1, -1, 1), booking(2, 24, 25)];
        assert_eq!(ids(&project(&bookings, now())), (Some(1), Some(2)));
    }
}
