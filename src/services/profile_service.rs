use crate::{
    dto::profiles::{ProfileList, ProfileQuery},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_profiles(
    state: &AppState,
    user: &AuthUser,
    query: ProfileQuery,
) -> AppResult<ApiResponse<ProfileList>> {
    ensure_admin(user)?;
    let role = query.role()?;
    let items = state.store.list_profiles(role).await?;
    let meta = Meta::new(items.len() as i64);
    Ok(ApiResponse::success("Profiles", ProfileList { items }, Some(meta)))
}
