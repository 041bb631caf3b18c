use actix_web::{web, HttpRequest, HttpResponse};

use crate::config::MAX_TWEET_LENGTH;
use crate::core::errors::ApiError;
use crate::core::helpers::{parse_json, sanitize_text};
use crate::core::images::ImageStore;
use crate::core::store::{Engagement, TweetDelete, TweetStore, Update};
use crate::feed;
use crate::models::models::Tweet;
use crate::AppState;

pub fn create_tweet(
    tweets: &dyn TweetStore,
    author_id: &str,
    content: &str,
    image: Option<String>,
) -> Result<Tweet, ApiError> {
    let content = sanitize_text(content);
    if content.is_empty() && image.is_none() {
        return Err(ApiError::BadRequest(
            "Mandatory fields are missing".to_string(),
        ));
    }
    if content.len() > MAX_TWEET_LENGTH {
        return Err(ApiError::BadRequest("Content too long".to_string()));
    }
    let tweet = Tweet::new(author_id.to_string(), content, image);
    tweets.insert(tweet.clone())?;
    Ok(tweet)
}

pub fn like_tweet(tweets: &dyn TweetStore, tweet_id: &str, user_id: &str) -> Result<(), ApiError> {
    match tweets.add_member(tweet_id, Engagement::Likes, user_id)? {
        Update::Applied => Ok(()),
        Update::Missing => Err(ApiError::NotFound("Tweet not found".to_string())),
        Update::Conflict => Err(ApiError::BadRequest("Already liked".to_string())),
    }
}

pub fn unlike_tweet(tweets: &dyn TweetStore, tweet_id: &str, user_id: &str) -> Result<(), ApiError> {
    match tweets.remove_member(tweet_id, Engagement::Likes, user_id)? {
        Update::Applied => Ok(()),
        Update::Missing => Err(ApiError::NotFound("Tweet not found".to_string())),
        Update::Conflict => Err(ApiError::BadRequest("Tweet not liked".to_string())),
    }
}

pub fn retweet(tweets: &dyn TweetStore, tweet_id: &str, user_id: &str) -> Result<(), ApiError> {
    match tweets.add_member(tweet_id, Engagement::Retweets, user_id)? {
        Update::Applied => Ok(()),
        Update::Missing => Err(ApiError::NotFound("Tweet not found".to_string())),
        Update::Conflict => Err(ApiError::BadRequest("Already retweeted".to_string())),
    }
}

/// Creates the reply as its own tweet and appends it to the parent's
/// reply list, oldest first.
pub fn reply_to_tweet(
    tweets: &dyn TweetStore,
    parent_id: &str,
    author_id: &str,
    content: &str,
) -> Result<Tweet, ApiError> {
    let content = sanitize_text(content);
    if content.is_empty() {
        return Err(ApiError::BadRequest(
            "Mandatory fields are missing".to_string(),
        ));
    }
    if content.len() > MAX_TWEET_LENGTH {
        return Err(ApiError::BadRequest("Content too long".to_string()));
    }
    let reply = Tweet::new(author_id.to_string(), content, None);
    match tweets.append_reply(parent_id, reply.clone())? {
        Update::Applied => Ok(reply),
        _ => Err(ApiError::NotFound("Tweet not found".to_string())),
    }
}

/// Replies of a deleted tweet are left in place; their ids dangle in the
/// parent's reply list and get skipped at hydration.
pub fn delete_tweet(
    tweets: &dyn TweetStore,
    tweet_id: &str,
    requester_id: &str,
) -> Result<(), ApiError> {
    match tweets.delete_owned(tweet_id, requester_id)? {
        TweetDelete::Deleted => Ok(()),
        TweetDelete::Missing => Err(ApiError::NotFound("Tweet not found".to_string())),
        TweetDelete::NotOwner => Err(ApiError::Unauthorized),
    }
}

// === HTTP Handlers ===

pub async fn handle_create(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let caller = state.sessions.verify(&req, state.users.as_ref())?;
    let value = parse_json(&body)?;
    let content = value["content"].as_str().unwrap_or_default();
    let image = match value["image"].as_str() {
        Some(encoded) => Some(save_image(&state.images, encoded)?),
        None => None,
    };
    let tweet = create_tweet(state.tweets.as_ref(), &caller.id, content, image)?;
    Ok(HttpResponse::Ok().json(tweet))
}

fn save_image(images: &ImageStore, encoded: &str) -> Result<String, ApiError> {
    if encoded.is_empty() {
        return Err(ApiError::BadRequest("Invalid image encoding".to_string()));
    }
    images.save(encoded)
}

pub async fn handle_like(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let caller = state.sessions.verify(&req, state.users.as_ref())?;
    like_tweet(state.tweets.as_ref(), &path, &caller.id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "liked"})))
}

pub async fn handle_dislike(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let caller = state.sessions.verify(&req, state.users.as_ref())?;
    unlike_tweet(state.tweets.as_ref(), &path, &caller.id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "unliked"})))
}

pub async fn handle_retweet(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let caller = state.sessions.verify(&req, state.users.as_ref())?;
    retweet(state.tweets.as_ref(), &path, &caller.id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "retweeted"})))
}

pub async fn handle_reply(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let caller = state.sessions.verify(&req, state.users.as_ref())?;
    let value = parse_json(&body)?;
    let content = value["content"].as_str().unwrap_or_default();
    let reply = reply_to_tweet(state.tweets.as_ref(), &path, &caller.id, content)?;
    Ok(HttpResponse::Ok().json(reply))
}

pub async fn handle_delete(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let caller = state.sessions.verify(&req, state.users.as_ref())?;
    delete_tweet(state.tweets.as_ref(), &path, &caller.id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({"status": "deleted"})))
}

pub async fn handle_get(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    state.sessions.verify(&req, state.users.as_ref())?;
    let tweet = feed::get_tweet(state.users.as_ref(), state.tweets.as_ref(), &path)?
        .ok_or_else(|| ApiError::NotFound("Tweet not found".to_string()))?;
    Ok(HttpResponse::Ok().json(tweet))
}

pub async fn handle_list(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    state.sessions.verify(&req, state.users.as_ref())?;
    let tweets = feed::list_tweets(state.users.as_ref(), state.tweets.as_ref())?;
    Ok(HttpResponse::Ok().json(tweets))
}

/// Raw image bytes, no auth. Content type comes from the stored file.
pub async fn handle_image(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let tweet = state
        .tweets
        .get(&path)?
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;
    let name = tweet
        .image
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;
    let (bytes, content_type) = state.images.load(&name)?;
    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;

    #[test]
    fn empty_content_needs_an_image() {
        let store = MemoryStore::new();
        assert!(matches!(
            create_tweet(&store, "author", "", None),
            Err(ApiError::BadRequest(_))
        ));
        // Markup-only content sanitizes down to empty.
        assert!(matches!(
            create_tweet(&store, "author", "<script>x</script>", None),
            Err(ApiError::BadRequest(_))
        ));
        let tweet = create_tweet(&store, "author", "", Some("pic.jpg".to_string())).unwrap();
        assert_eq!(tweet.image.as_deref(), Some("pic.jpg"));
    }

    #[test]
    fn oversize_content_is_rejected() {
        let store = MemoryStore::new();
        let long = "a".repeat(MAX_TWEET_LENGTH + 1);
        assert!(matches!(
            create_tweet(&store, "author", &long, None),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn second_like_conflicts_until_unliked() {
        let store = MemoryStore::new();
        let tweet = create_tweet(&store, "author", "hello", None).unwrap();

        like_tweet(&store, &tweet.id, "alice").unwrap();
        assert!(matches!(
            like_tweet(&store, &tweet.id, "alice"),
            Err(ApiError::BadRequest(_))
        ));
        unlike_tweet(&store, &tweet.id, "alice").unwrap();
        like_tweet(&store, &tweet.id, "alice").unwrap();

        assert!(matches!(
            unlike_tweet(&store, &tweet.id, "bob"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn retweet_has_the_same_idempotency_contract() {
        let store = MemoryStore::new();
        let tweet = create_tweet(&store, "author", "hello", None).unwrap();

        retweet(&store, &tweet.id, "alice").unwrap();
        assert!(matches!(
            retweet(&store, &tweet.id, "alice"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            retweet(&store, "missing", "alice"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn self_like_is_permitted() {
        let store = MemoryStore::new();
        let tweet = create_tweet(&store, "author", "hello", None).unwrap();
        like_tweet(&store, &tweet.id, "author").unwrap();
        let stored = TweetStore::get(&store, &tweet.id).unwrap().unwrap();
        assert_eq!(stored.likes, vec!["author".to_string()]);
    }

    #[test]
    fn replies_append_in_posting_order() {
        let store = MemoryStore::new();
        let parent = create_tweet(&store, "author", "parent", None).unwrap();

        let mut expected = Vec::new();
        for i in 0..4 {
            let reply = reply_to_tweet(&store, &parent.id, "replier", &format!("r{}", i)).unwrap();
            assert_eq!(reply.author_id, "replier");
            expected.push(reply.id);
        }
        let parent = TweetStore::get(&store, &parent.id).unwrap().unwrap();
        assert_eq!(parent.replies, expected);
    }

    #[test]
    fn reply_rejects_empty_content_and_missing_parent() {
        let store = MemoryStore::new();
        let parent = create_tweet(&store, "author", "parent", None).unwrap();
        assert!(matches!(
            reply_to_tweet(&store, &parent.id, "replier", ""),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            reply_to_tweet(&store, "missing", "replier", "hi"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn delete_is_restricted_to_the_author() {
        let store = MemoryStore::new();
        let tweet = create_tweet(&store, "author", "mine", None).unwrap();

        assert!(matches!(
            delete_tweet(&store, &tweet.id, "someone-else"),
            Err(ApiError::Unauthorized)
        ));
        delete_tweet(&store, &tweet.id, "author").unwrap();
        assert!(matches!(
            delete_tweet(&store, &tweet.id, "author"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn deleting_a_parent_leaves_replies_in_place() {
        let store = MemoryStore::new();
        let parent = create_tweet(&store, "author", "parent", None).unwrap();
        let reply = reply_to_tweet(&store, &parent.id, "replier", "hi").unwrap();

        delete_tweet(&store, &parent.id, "author").unwrap();
        assert!(TweetStore::get(&store, &parent.id).unwrap().is_none());
        assert!(TweetStore::get(&store, &reply.id).unwrap().is_some());
    }
}
