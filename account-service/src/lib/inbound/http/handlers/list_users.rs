use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::inbound::http::router::AppState;

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<ApiSuccess<ListUsersResponseData>, ApiError> {
    let users: Vec<UserData> = state
        .user_service
        .list_users()
        .await?
        .iter()
        .map(UserData::from)
        .collect();

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ListUsersResponseData {
            count: users.len(),
            users,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListUsersResponseData {
    pub count: usize,
    pub users: Vec<UserData>,
}
