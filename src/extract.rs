use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};

use crate::errors::AppError;

pub const SHARER_USER_ID: &str = "X-Sharer-User-Id";

/// Acting user taken from the `X-Sharer-User-Id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharerUserId(pub i64);

impl SharerUserId {
    pub fn id(&self) -> i64 {
        self.0
    }
}

impl FromRequest for SharerUserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let parsed = match req.headers().get(SHARER_USER_ID) {
            None => Err(AppError::Validation(format!(
                "Required request header '{SHARER_USER_ID}' is not present"
            ))),
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .map(SharerUserId)
                .ok_or_else(|| {
                    AppError::Validation(format!("Header '{SHARER_USER_ID}' must be an integer"))
                }),
        };
        ready(parsed)
    }
}
