use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use niffler_common::{FriendJson, UserJson, UsersQuery};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Error;
use crate::service::{ProfileUpdate, UserDataService};

pub type Result<T> = std::result::Result<T, AppError>;

pub struct AppError(Error);

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(%status, error = %self.0, "request failed");
        (status, self.0.to_string()).into_response()
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

#[derive(Clone)]
pub struct State {
    service: Arc<UserDataService>,
}

impl State {
    pub fn new(service: UserDataService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FriendsParams {
    #[serde(default)]
    pub include_pending: bool,
}

pub fn router(state: State) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/add-user/:username", post(add_user))
        .route("/update-user", post(update_user))
        .route("/:username/current", get(current_user))
        .route("/:username/all-users", get(all_users))
        .route("/:username/friends", get(friends))
        .route("/:username/invitations", get(invitations))
        .route("/:username/invite", post(send_invitation))
        .route("/:username/accept-invitation", post(accept_invitation))
        .route("/:username/decline-invitation", post(decline_invitation))
        .route("/:username/remove-friend", post(remove_friend))
        .layer(Extension(state))
}

async fn root() -> &'static str {
    "niffler-userdata"
}

async fn add_user(Extension(state): Extension<State>, Path(username): Path<String>) -> Result<Json<UserJson>> {
    Ok(Json(state.service.register(&username)?))
}

async fn update_user(Extension(state): Extension<State>, Json(user): Json<UserJson>) -> Result<Json<UserJson>> {
    debug!(username = %user.username, "update-user");
    Ok(Json(state.service.update(ProfileUpdate::from(user))?))
}

async fn current_user(Extension(state): Extension<State>, Path(username): Path<String>) -> Result<Json<UserJson>> {
    Ok(Json(state.service.current_user(&username)?))
}

async fn all_users(
    Extension(state): Extension<State>,
    Path(username): Path<String>,
    Query(query): Query<UsersQuery>,
) -> Result<Json<Vec<UserJson>>> {
    Ok(Json(state.service.all_users(&username, Some(&query))?))
}

async fn friends(
    Extension(state): Extension<State>,
    Path(username): Path<String>,
    Query(params): Query<FriendsParams>,
) -> Result<Json<Vec<UserJson>>> {
    Ok(Json(state.service.friends(&username, params.include_pending)?))
}

async fn invitations(Extension(state): Extension<State>, Path(username): Path<String>) -> Result<Json<Vec<UserJson>>> {
    Ok(Json(state.service.invitations(&username)?))
}

async fn send_invitation(
    Extension(state): Extension<State>,
    Path(username): Path<String>,
    Json(friend): Json<FriendJson>,
) -> Result<Json<UserJson>> {
    Ok(Json(state.service.send_invitation(&username, &friend.username)?))
}

async fn accept_invitation(
    Extension(state): Extension<State>,
    Path(username): Path<String>,
    Json(inviter): Json<FriendJson>,
) -> Result<Json<Vec<UserJson>>> {
    Ok(Json(state.service.accept_invitation(&username, &inviter.username)?))
}

async fn decline_invitation(
    Extension(state): Extension<State>,
    Path(username): Path<String>,
    Json(inviter): Json<FriendJson>,
) -> Result<Json<Vec<UserJson>>> {
    Ok(Json(state.service.decline_invitation(&username, &inviter.username)?))
}

async fn remove_friend(
    Extension(state): Extension<State>,
    Path(username): Path<String>,
    Json(friend): Json<FriendJson>,
) -> Result<Json<Vec<UserJson>>> {
    Ok(Json(state.service.remove_friend(&username, &friend.username)?))
}
