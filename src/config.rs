pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 3;
pub const MAX_TWEET_LENGTH: usize = 5000;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_LOCATION_LENGTH: usize = 100;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const DEV_TOKEN_SECRET: &str = "chirp-dev-secret";

pub fn port() -> u16 {
    std::env::var("CHIRP_PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(3000)
}

pub fn token_secret() -> String {
    std::env::var("CHIRP_TOKEN_SECRET").unwrap_or_else(|_| DEV_TOKEN_SECRET.to_string())
}

/// Unset means tokens never expire.
pub fn token_ttl_hours() -> Option<i64> {
    std::env::var("CHIRP_TOKEN_TTL_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
}

pub fn image_dir() -> String {
    std::env::var("CHIRP_IMAGE_DIR").unwrap_or_else(|_| "./images".to_string())
}
