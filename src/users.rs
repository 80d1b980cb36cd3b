use crate::{
    errors::{AppError, AppResult},
    repository::{NewUser, UserPatch},
    structs::User,
    AppState,
};

pub async fn get_users(state: &AppState) -> AppResult<Vec<User>> {
    state.users.find_all().await
}

pub async fn find_user(state: &AppState, user_id: i64) -> AppResult<User> {
    state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))
}

pub async fn ensure_user_exists(state: &AppState, user_id: i64) -> AppResult<()> {
    find_user(state, user_id).await.map(|_| ())
}

pub async fn create_user(state: &AppState, user: NewUser) -> AppResult<User> {
    state.users.create(user).await
}

pub async fn update_user(state: &AppState, user_id: i64, patch: UserPatch) -> AppResult<User> {
    state
        .users
        .update(user_id, patch)
        .await?
        .ok_or_else(|| user_not_found(user_id))
}

pub async fn delete_user(state: &AppState, user_id: i64) -> AppResult<()> {
    if state.users.delete(user_id).await? {
        Ok(())
    } else {
        Err(user_not_found(user_id))
    }
}

fn user_not_found(user_id: i64) -> AppError {
    log::error!("User with id not found: {}", user_id);
    AppError::NotFound(format!("User with id not found: {user_id}"))
}
