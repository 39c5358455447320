use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::{AppError, AppResult},
    models::{Profile, Role},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProfileQuery {
    /// `admin` or `mesero`; omit for every profile.
    pub role: Option<String>,
}

impl ProfileQuery {
    pub fn role(&self) -> AppResult<Option<Role>> {
        match self.role.as_deref().filter(|r| !r.is_empty()) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<Role>()
                .map(Some)
                .map_err(|_| AppError::BadRequest("Invalid role".into())),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProfileList {
    #[schema(value_type = Vec<Profile>)]
    pub items: Vec<Profile>,
}
