// User handlers - /api/users and /api/auth/setup-user

use axum::{extract::State, http::StatusCode, Json};

use crate::api::extract::{ValidatedJson, ValidatedQuery};
use crate::app_state::AppState;
use crate::entities::EntUser;
use crate::error::AppResult;
use crate::framework::Record;
use crate::infrastructure::middleware::Vc;
use crate::schemas::{CreateUserRequest, UpdateProfileRequest, UserQuery};

pub async fn list_users_handler(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> AppResult<Json<Vec<Record<EntUser>>>> {
    Ok(Json(state.users.find(&query).await?))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    vc: Vc,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<Record<EntUser>>)> {
    let identity = vc.require_identity()?;
    let user = state.users.create(identity, request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_profile_handler(
    State(state): State<AppState>,
    vc: Vc,
    ValidatedJson(patch): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<Json<Record<EntUser>>> {
    let identity = vc.require_identity()?;
    Ok(Json(state.users.update_profile(identity, patch).await?))
}

/// Profile for the signed-in caller; 201 when it was created by this call
pub async fn setup_user_handler(
    State(state): State<AppState>,
    vc: Vc,
) -> AppResult<(StatusCode, Json<Record<EntUser>>)> {
    let identity = vc.require_identity()?;
    let (user, created) = state.users.ensure(identity).await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(user)))
}
