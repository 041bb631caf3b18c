use actix_web::{web, HttpRequest, HttpResponse};

use crate::core::errors::ApiError;
use crate::core::store::{Update, UserStore};
use crate::feed::summaries;
use crate::models::models::User;
use crate::AppState;

pub fn follow_user(users: &dyn UserStore, follower: &User, target_id: &str) -> Result<(), ApiError> {
    if follower.id == target_id {
        return Err(ApiError::Forbidden("Cannot follow yourself".to_string()));
    }
    // Both sides of the edge are written in one unit of work; the store
    // re-checks existence and membership under its own lock.
    match users.add_follow_edge(&follower.id, target_id)? {
        Update::Applied => Ok(()),
        Update::Missing => Err(ApiError::NotFound("User not found".to_string())),
        Update::Conflict => Err(ApiError::Conflict("Already following".to_string())),
    }
}

pub fn unfollow_user(
    users: &dyn UserStore,
    follower: &User,
    target_id: &str,
) -> Result<(), ApiError> {
    match users.remove_follow_edge(&follower.id, target_id)? {
        Update::Applied => Ok(()),
        Update::Missing => Err(ApiError::NotFound("User not found".to_string())),
        Update::Conflict => Err(ApiError::Conflict("Not following".to_string())),
    }
}

// === HTTP Handlers ===

pub async fn handle_follow(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let caller = state.sessions.verify(&req, state.users.as_ref())?;
    follow_user(state.users.as_ref(), &caller, &path)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "followed"})))
}

pub async fn handle_unfollow(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let caller = state.sessions.verify(&req, state.users.as_ref())?;
    unfollow_user(state.users.as_ref(), &caller, &path)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "unfollowed"})))
}

pub async fn handle_relationships(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    state.sessions.verify(&req, state.users.as_ref())?;
    let users = state.users.as_ref();
    let user = users
        .get(&path)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "followers": summaries(users, &user.followers)?,
        "following": summaries(users, &user.following)?,
    })))
}
