use actix_web::{web, HttpResponse};

use crate::config::{MAX_USERNAME_LENGTH, MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH};
use crate::core::errors::ApiError;
use crate::core::helpers::{hash_password, parse_json, sanitize_text, verify_password};
use crate::core::store::UserInsert;
use crate::models::models::{PublicProfile, User};
use crate::AppState;

pub async fn register_user(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let value = parse_json(&body)?;
    let name = value["name"].as_str().unwrap_or_default();
    let email = value["email"].as_str().unwrap_or_default();
    let username = value["username"].as_str().unwrap_or_default();
    let password = value["password"].as_str().unwrap_or_default();

    if name.is_empty() || email.is_empty() || username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Mandatory fields are missing".to_string(),
        ));
    }
    if username.len() < MIN_USERNAME_LENGTH || username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(
            "Username must be 3-50 characters".to_string(),
        ));
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(
            "Password must be at least 3 characters".to_string(),
        ));
    }

    // Sanitize display text at input time; the hash is opaque from here on.
    let name = sanitize_text(name);
    let username = sanitize_text(username);
    let user = User::new(name, username, email.to_string(), hash_password(password)?);

    match state.users.insert(user)? {
        UserInsert::Created(user) => Ok(HttpResponse::Ok().json(PublicProfile::from(&user))),
        UserInsert::DuplicateEmail => Err(ApiError::BadRequest(
            "User with given email already exists".to_string(),
        )),
        UserInsert::DuplicateUsername => Err(ApiError::BadRequest(
            "Username already exists".to_string(),
        )),
    }
}

pub async fn login_user(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let value = parse_json(&body)?;
    let username = value["username"].as_str().unwrap_or_default();
    let password = value["password"].as_str().unwrap_or_default();

    if username.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Mandatory fields are missing".to_string(),
        ));
    }

    let user = match state.users.find_by_username(username)? {
        Some(user) if verify_password(password, &user.password) => user,
        _ => return Err(ApiError::Unauthorized),
    };

    let token = state.sessions.issue(&user.id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "token": token,
        "user_id": user.id,
        "name": user.name,
        "username": user.username,
    })))
}
