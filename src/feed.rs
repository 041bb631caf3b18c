use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::store::{StoreError, TweetStore, UserStore};
use crate::models::models::{Tweet, UserSummary};

/// A tweet with its id references resolved into summaries for display.
/// Ids that no longer resolve (deleted users or tweets) are skipped.
#[derive(Serialize)]
pub struct HydratedTweet {
    pub id: String,
    pub content: String,
    pub author: Option<UserSummary>,
    pub image: Option<String>,
    pub likes: Vec<UserSummary>,
    pub retweet_by: Vec<UserSummary>,
    pub replies: Vec<HydratedTweet>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resolves each id to a summary, dropping ids with no live user behind them.
pub fn summaries(users: &dyn UserStore, ids: &[String]) -> Result<Vec<UserSummary>, StoreError> {
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(user) = users.get(id)? {
            out.push(UserSummary::from(&user));
        }
    }
    Ok(out)
}

/// Hydrates one tweet, following reply ids `depth` levels down. At depth
/// zero the reply list is left empty rather than half-resolved.
pub fn hydrate(
    users: &dyn UserStore,
    tweets: &dyn TweetStore,
    tweet: &Tweet,
    depth: usize,
) -> Result<HydratedTweet, StoreError> {
    let author = users.get(&tweet.author_id)?.map(|u| UserSummary::from(&u));
    let mut replies = Vec::new();
    if depth > 0 {
        for reply_id in &tweet.replies {
            if let Some(reply) = tweets.get(reply_id)? {
                replies.push(hydrate(users, tweets, &reply, depth - 1)?);
            }
        }
    }
    Ok(HydratedTweet {
        id: tweet.id.clone(),
        content: tweet.content.clone(),
        author,
        image: tweet.image.clone(),
        likes: summaries(users, &tweet.likes)?,
        retweet_by: summaries(users, &tweet.retweet_by)?,
        replies,
        created_at: tweet.created_at,
        updated_at: tweet.updated_at,
    })
}

/// All tweets, newest first, replies one level deep.
pub fn list_tweets(
    users: &dyn UserStore,
    tweets: &dyn TweetStore,
) -> Result<Vec<HydratedTweet>, StoreError> {
    tweets
        .list()?
        .iter()
        .map(|t| hydrate(users, tweets, t, 1))
        .collect()
}

/// The single-tweet view hydrates one level further than the list view.
pub fn get_tweet(
    users: &dyn UserStore,
    tweets: &dyn TweetStore,
    id: &str,
) -> Result<Option<HydratedTweet>, StoreError> {
    match tweets.get(id)? {
        Some(tweet) => Ok(Some(hydrate(users, tweets, &tweet, 2)?)),
        None => Ok(None),
    }
}

/// One author's tweets, newest first.
pub fn tweets_by(
    users: &dyn UserStore,
    tweets: &dyn TweetStore,
    author_id: &str,
) -> Result<Vec<HydratedTweet>, StoreError> {
    tweets
        .list_by_author(author_id)?
        .iter()
        .map(|t| hydrate(users, tweets, t, 1))
        .collect()
}
