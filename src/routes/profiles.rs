use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};

use crate::{
    dto::profiles::{ProfileList, ProfileQuery},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::profile_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_profiles))
}

#[utoipa::path(
    get,
    path = "/api/profiles",
    params(ProfileQuery),
    responses(
        (status = 200, description = "Profiles ordered by email", body = ApiResponse<ProfileList>),
        (status = 400, description = "Invalid role"),
        (status = 403, description = "Admin only"),
    ),
    security(("bearer_auth" = [])),
    tag = "Profiles"
)]
pub async fn list_profiles(
    State(state): State<AppState>,
    user: AuthUser,
    query: Result<Query<ProfileQuery>, QueryRejection>,
) -> AppResult<Json<ApiResponse<ProfileList>>> {
    let Query(query) = query?;
    let resp = profile_service::list_profiles(&state, &user, query).await?;
    Ok(Json(resp))
}
