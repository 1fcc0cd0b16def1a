use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateUserRequest, UserList},
    model::{NewUser, PublicUser},
};
use crate::{error::ApiError, response::Envelope, state::AppState};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/ping", get(ping))
        .route("/users", get(list_users).post(add_user))
        .route("/users/:id", get(get_user))
}

pub async fn ping() -> Json<Envelope<()>> {
    Json(Envelope::message("pong!"))
}

#[instrument(skip(state, payload))]
pub async fn add_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<()>>), ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "unreadable user payload");
        ApiError::InvalidPayload
    })?;
    let req = payload.validate()?;

    let new_user = NewUser::create(req.username, req.email, &req.password)?;
    let user = state.store.insert(new_user).await.map_err(|e| {
        warn!(error = %e, "user insert rejected");
        ApiError::from(e)
    })?;

    info!(user_id = user.id, email = %user.email, "user added");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::message(format!("{} was added!", user.email))),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<PublicUser>>, ApiError> {
    let id = id.parse::<i64>().map_err(|_| ApiError::UserNotFound)?;
    let user = state
        .store
        .find_by_id(id)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    Ok(Json(Envelope::data(user.to_public())))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Envelope<UserList>>, ApiError> {
    let users = state
        .store
        .list()
        .await?
        .iter()
        .map(PublicUser::from)
        .collect();
    Ok(Json(Envelope::data(UserList { users })))
}
