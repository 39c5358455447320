use axum::{Json, Router, routing::get};

use crate::{
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Resolved caller", body = ApiResponse<AuthUser>),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Profile missing"),
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn me(user: AuthUser) -> Json<ApiResponse<AuthUser>> {
    Json(ApiResponse::success("Me", user, Some(Meta::empty())))
}
