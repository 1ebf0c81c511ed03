use axum::http::StatusCode;
use axum::Extension;

use super::ApiSuccess;
use super::UserData;
use crate::inbound::http::middleware::CurrentUser;

/// The identity the access gate resolved for this request.
pub async fn current_user(
    Extension(CurrentUser(profile)): Extension<CurrentUser>,
) -> ApiSuccess<UserData> {
    ApiSuccess::new(StatusCode::OK, UserData::from(&profile))
}
