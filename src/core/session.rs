use actix_web::http::header;
use actix_web::HttpRequest;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::core::store::UserStore;
use crate::models::models::User;

#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    /// Header absent, no `Bearer ` prefix, or the token is not even a JWT.
    Malformed,
    /// Signature or claim validation failed.
    Invalid,
    /// Token is sound but the subject user no longer exists.
    UnknownSubject,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Issues and verifies the stateless bearer tokens that gate every
/// mutating route. Validity is the HS256 signature plus a live re-check
/// that the subject user still exists; no session record is kept.
#[derive(Clone)]
pub struct SessionAuthority {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_hours: Option<i64>,
}

impl SessionAuthority {
    /// `ttl_hours = None` mints non-expiring tokens; tokens that do carry
    /// `exp` are still checked against the clock either way.
    pub fn new(secret: &str, ttl_hours: Option<i64>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        SessionAuthority {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_hours,
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: self.ttl_hours.map(|h| now + h * 3600),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    pub fn decode(&self, token: &str) -> Result<Claims, SessionError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => SessionError::Malformed,
                _ => SessionError::Invalid,
            })
    }

    /// Resolves the caller behind the `Authorization` header. Returns the
    /// full user record so handlers can run self-action guards on it.
    pub fn verify(&self, req: &HttpRequest, users: &dyn UserStore) -> Result<User, ApiError> {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(SessionError::Malformed)?;
        let claims = self.decode(token)?;
        let user = users
            .get(&claims.sub)?
            .ok_or(SessionError::UnknownSubject)?;
        Ok(user)
    }
}
