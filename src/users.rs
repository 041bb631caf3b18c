use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;

use crate::config::{MAX_LOCATION_LENGTH, MAX_NAME_LENGTH};
use crate::core::errors::ApiError;
use crate::core::helpers::{parse_json, sanitize_text};
use crate::feed;
use crate::models::models::PublicProfile;
use crate::AppState;

pub async fn handle_get_user(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    state.sessions.verify(&req, state.users.as_ref())?;
    let user = state
        .users
        .get(&path)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(HttpResponse::Ok().json(PublicProfile::from(&user)))
}

/// Self-only edit of name, date of birth and location. All three fields
/// are required, matching the account edit form.
pub async fn handle_update_profile(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let caller = state.sessions.verify(&req, state.users.as_ref())?;
    if caller.id != *path {
        return Err(ApiError::Forbidden(
            "Not allowed to edit other details".to_string(),
        ));
    }

    let value = parse_json(&body)?;
    let name = value["name"].as_str().unwrap_or_default();
    let dob = value["dob"].as_str().unwrap_or_default();
    let location = value["location"].as_str().unwrap_or_default();
    if name.is_empty() || dob.is_empty() || location.is_empty() {
        return Err(ApiError::BadRequest(
            "Mandatory fields are missing".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LENGTH || location.len() > MAX_LOCATION_LENGTH {
        return Err(ApiError::BadRequest("Field too long".to_string()));
    }
    let dob = NaiveDate::parse_from_str(dob, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest("Invalid date of birth".to_string()))?;

    let updated = state
        .users
        .update_profile(&caller.id, sanitize_text(name), sanitize_text(location), dob)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(HttpResponse::Ok().json(PublicProfile::from(&updated)))
}

pub async fn handle_user_tweets(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    state.sessions.verify(&req, state.users.as_ref())?;
    if state.users.get(&path)?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    let tweets = feed::tweets_by(state.users.as_ref(), state.tweets.as_ref(), &path)?;
    Ok(HttpResponse::Ok().json(tweets))
}

pub async fn handle_upload_profile_pic(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let caller = state.sessions.verify(&req, state.users.as_ref())?;
    if caller.id != *path {
        return Err(ApiError::Forbidden(
            "Not allowed to change other's profile".to_string(),
        ));
    }

    let value = parse_json(&body)?;
    let encoded = value["image"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Mandatory fields are missing".to_string()))?;
    let name = state.images.save(encoded)?;
    state
        .users
        .set_profile_pic(&caller.id, name.clone())?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "uploaded",
        "profile_pic": name,
    })))
}

/// Raw profile picture bytes, no auth. Content type follows the stored file.
pub async fn handle_profile_pic(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user = state
        .users
        .get(&path)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let name = user
        .profile_pic
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;
    let (bytes, content_type) = state.images.load(&name)?;
    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}
