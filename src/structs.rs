use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::AppError;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub owner_id: i64,
    pub request_id: Option<i64>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ItemRequest {
    pub id: i64,
    pub description: String,
    pub requester_id: i64,
    pub created: NaiveDateTime,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub item_id: i64,
    pub author_id: i64,
    pub author_name: String,
    pub created: NaiveDateTime,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Waiting,
    Approved,
    Rejected,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Waiting => "WAITING",
            BookingStatus::Approved => "APPROVED",
            BookingStatus::Rejected => "REJECTED",
        }
    }
}

/// A booking with its item and booker resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: BookingStatus,
    pub item: Item,
    pub booker: User,
}

/// Listing filter for `GET /bookings` and `GET /bookings/owner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookingState {
    #[default]
    All,
    Current,
    Past,
    Future,
    Waiting,
    Rejected,
}

impl BookingState {
    pub const ALL_STATES: [BookingState; 6] = [
        BookingState::All,
        BookingState::Current,
        BookingState::Past,
        BookingState::Future,
        BookingState::Waiting,
        BookingState::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingState::All => "ALL",
            BookingState::Current => "CURRENT",
            BookingState::Past => "PAST",
            BookingState::Future => "FUTURE",
            BookingState::Waiting => "WAITING",
            BookingState::Rejected => "REJECTED",
        }
    }

    pub fn matches(&self, booking: &Booking, now: NaiveDateTime) -> bool {
        match self {
            BookingState::All => true,
            BookingState::Current => {
                booking.start <= now
                    && now < booking.end
                    && matches!(
                        booking.status,
                        BookingStatus::Approved | BookingStatus::Rejected
                    )
            }
            BookingState::Past => booking.end < now && booking.status == BookingStatus::Approved,
            BookingState::Future => booking.start > now,
            BookingState::Waiting => booking.status == BookingStatus::Waiting,
            BookingState::Rejected => booking.status == BookingStatus::Rejected,
        }
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingState {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL_STATES
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| AppError::Validation(format!("Unknown state: {s}")))
    }
}

impl<'de> Deserialize<'de> for BookingState {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for BookingState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn booking(start: i64, end: i64, status: BookingStatus) -> Booking {
        Booking {
            id: 1,
            start: now() + Duration::hours(start),
            end: now() + Duration::hours(end),
            status,
            item: Item {
                id: 1,
                name: "drill".into(),
                description: "cordless".into(),
                available: true,
                owner_id: 1,
                request_id: None,
            },
            booker: User {
                id: 2,
                name: "booker".into(),
                email: "booker@example.com".into(),
            },
        }
    }

    #[test]
    fn parse_state_ignores_case() {
        assert_eq!("past".parse::<BookingState>().unwrap(), BookingState::Past);
        assert_eq!(
            "Waiting".parse::<BookingState>().unwrap(),
            BookingState::Waiting
        );
    }

    #[test]
    fn parse_state_rejects_unknown_token() {
        let err = "UNSUPPORTED_STATUS".parse::<BookingState>().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(err.to_string(), "Unknown state: UNSUPPORTED_STATUS");
    }

    #[test]
    fn current_requires_a_decided_status() {
        let approved = booking(-1, 1, BookingStatus::Approved);
        let rejected = booking(-1, 1, BookingStatus::Rejected);
        let waiting = booking(-1, 1, BookingStatus::Waiting);
        assert!(BookingState::Current.matches(&approved, now()));
        assert!(BookingState::Current.matches(&rejected, now()));
        assert!(!BookingState::Current.matches(&waiting, now()));
    }

    #[test]
    fn current_window_is_half_open() {
        let starts_now = booking(0, 1, BookingStatus::Approved);
        let ends_now = booking(-1, 0, BookingStatus::Approved);
        assert!(BookingState::Current.matches(&starts_now, now()));
        assert!(!BookingState::Current.matches(&ends_now, now()));
    }

    #[test]
    fn past_only_counts_approved() {
        assert!(BookingState::Past.matches(&booking(-3, -1, BookingStatus::Approved), now()));
        assert!(!BookingState::Past.matches(&booking(-3, -1, BookingStatus::Rejected), now()));
        assert!(!BookingState::Past.matches(&booking(-3, 0, BookingStatus::Approved), now()));
    }

    #[test]
    fn future_ignores_status() {
        assert!(BookingState::Future.matches(&booking(1, 2, BookingStatus::Rejected), now()));
        assert!(!BookingState::Future.matches(&booking(0, 2, BookingStatus::Waiting), now()));
    }

    #[test]
    fn status_states_match_on_status_only() {
        let waiting = booking(-5, -4, BookingStatus::Waiting);
        assert!(BookingState::Waiting.matches(&waiting, now()));
        assert!(!BookingState::Rejected.matches(&waiting, now()));
        assert!(BookingState::All.matches(&waiting, now()));
    }
}
