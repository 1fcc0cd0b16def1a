use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest},
        extractors::AuthUser,
    },
    error::{ApiError, IdentityError},
    response::Envelope,
    state::AppState,
    users::{
        dto::CreateUserRequest,
        model::{NewUser, PublicUser},
    },
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", get(logout))
        .route("/auth/status", get(status))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "unreadable register payload");
        ApiError::InvalidPayload
    })?;
    let req = payload.validate()?;

    let new_user = NewUser::create(req.username, req.email, &req.password)?;
    let user = match state.store.insert(new_user).await {
        Ok(u) => u,
        Err(IdentityError::DuplicateIdentity(field)) => {
            warn!(%field, "register with taken identity");
            return Err(ApiError::UserExists);
        }
        Err(e) => return Err(e.into()),
    };

    let auth_token = state.jwt.issue(user.id)?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new("Successfully registered.", auth_token)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(mut payload) = payload.map_err(|_| ApiError::InvalidPayload)?;
    payload.email = payload.email.trim().to_lowercase();

    let user = state
        .store
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::UnknownLogin
        })?;

    if !user.active {
        warn!(user_id = user.id, "login for inactive user");
        return Err(ApiError::InvalidCredentials);
    }
    if let Err(e) = user.check_secret(&payload.password) {
        warn!(user_id = user.id, "login invalid password");
        return Err(e.into());
    }

    let auth_token = state.jwt.issue(user.id)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(AuthResponse::new("Successfully logged in.", auth_token)))
}

/// Tokens are stateless, so logging out only confirms the token is still good.
#[instrument(skip_all)]
pub async fn logout(AuthUser(user_id): AuthUser) -> Json<Envelope<()>> {
    info!(user_id, "user logged out");
    Json(Envelope::message("Successfully logged out."))
}

#[instrument(skip(state))]
pub async fn status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Envelope<PublicUser>>, ApiError> {
    let user = state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    Ok(Json(Envelope::data(user.to_public())))
}
