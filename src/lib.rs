use std::sync::Arc;

use actix_web::web;

pub mod auth;
pub mod config;
pub mod core;
pub mod feed;
pub mod follow;
pub mod models;
pub mod tweets;
pub mod users;

use crate::core::images::ImageStore;
use crate::core::session::SessionAuthority;
use crate::core::store::{TweetStore, UserStore};

/// Shared state handed to every handler. The stores are the only shared
/// mutable resource; handlers never keep entity state of their own.
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tweets: Arc<dyn TweetStore>,
    pub sessions: SessionAuthority,
    pub images: ImageStore,
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/auth/register", web::post().to(auth::register_user))
        .route("/api/auth/login", web::post().to(auth::login_user))
        .route("/api/tweet", web::post().to(tweets::handle_create))
        .route("/api/tweet", web::get().to(tweets::handle_list))
        .route("/api/tweet/{id}", web::get().to(tweets::handle_get))
        .route("/api/tweet/{id}", web::delete().to(tweets::handle_delete))
        .route("/api/tweet/{id}/like", web::post().to(tweets::handle_like))
        .route("/api/tweet/{id}/dislike", web::post().to(tweets::handle_dislike))
        .route("/api/tweet/{id}/retweet", web::post().to(tweets::handle_retweet))
        .route("/api/tweet/{id}/reply", web::post().to(tweets::handle_reply))
        .route("/api/tweet/{id}/image", web::get().to(tweets::handle_image))
        .route("/api/user/{id}", web::get().to(users::handle_get_user))
        .route("/api/user/{id}", web::put().to(users::handle_update_profile))
        .route(
            "/api/user/{id}/relationships",
            web::get().to(follow::handle_relationships),
        )
        .route("/api/user/{id}/follow", web::put().to(follow::handle_follow))
        .route("/api/user/{id}/unfollow", web::put().to(follow::handle_unfollow))
        .route("/api/user/{id}/tweets", web::post().to(users::handle_user_tweets))
        .route(
            "/api/user/{id}/uploadProfilePic",
            web::post().to(users::handle_upload_profile_pic),
        )
        .route(
            "/api/user/{id}/profile-pic",
            web::get().to(users::handle_profile_pic),
        );
}
