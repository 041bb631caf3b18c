use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use crate::models::models::{Tweet, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    Poisoned,
}

/// Outcome of a conditional membership or edge mutation. The check and the
/// write happen under one lock, so `Conflict` is authoritative, not advisory.
#[derive(Debug, PartialEq, Eq)]
pub enum Update {
    Applied,
    Missing,
    Conflict,
}

#[derive(Debug)]
pub enum UserInsert {
    Created(User),
    DuplicateEmail,
    DuplicateUsername,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TweetDelete {
    Deleted,
    Missing,
    NotOwner,
}

/// Which engagement set of a tweet a membership mutation targets.
#[derive(Debug, Clone, Copy)]
pub enum Engagement {
    Likes,
    Retweets,
}

pub trait UserStore: Send + Sync {
    /// Uniqueness of username and email is checked inside the store,
    /// in the same critical section as the write.
    fn insert(&self, user: User) -> Result<UserInsert, StoreError>;
    fn get(&self, id: &str) -> Result<Option<User>, StoreError>;
    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    fn update_profile(
        &self,
        id: &str,
        name: String,
        location: String,
        dob: NaiveDate,
    ) -> Result<Option<User>, StoreError>;
    fn set_profile_pic(&self, id: &str, path: String) -> Result<Option<User>, StoreError>;
    /// Adds `follower_id` to the target's followers and `target_id` to the
    /// follower's following as one unit of work. Never applies one side only.
    fn add_follow_edge(&self, follower_id: &str, target_id: &str) -> Result<Update, StoreError>;
    fn remove_follow_edge(&self, follower_id: &str, target_id: &str) -> Result<Update, StoreError>;
}

pub trait TweetStore: Send + Sync {
    fn insert(&self, tweet: Tweet) -> Result<(), StoreError>;
    fn get(&self, id: &str) -> Result<Option<Tweet>, StoreError>;
    /// All tweets, newest first.
    fn list(&self) -> Result<Vec<Tweet>, StoreError>;
    fn list_by_author(&self, author_id: &str) -> Result<Vec<Tweet>, StoreError>;
    /// Add-if-absent on the selected engagement set.
    fn add_member(
        &self,
        tweet_id: &str,
        set: Engagement,
        user_id: &str,
    ) -> Result<Update, StoreError>;
    /// Remove-if-present on the selected engagement set.
    fn remove_member(
        &self,
        tweet_id: &str,
        set: Engagement,
        user_id: &str,
    ) -> Result<Update, StoreError>;
    /// Persists the reply and appends its id to the parent's reply list in
    /// one unit of work, preserving append order.
    fn append_reply(&self, parent_id: &str, reply: Tweet) -> Result<Update, StoreError>;
    /// Removes the tweet only when `requester_id` is its author. Dangling
    /// reply ids in parents are left in place and skipped at hydration.
    fn delete_owned(&self, tweet_id: &str, requester_id: &str) -> Result<TweetDelete, StoreError>;
}

#[derive(Default)]
struct TweetTable {
    rows: HashMap<String, Tweet>,
    /// Insertion order, oldest first.
    order: Vec<String>,
}

/// In-memory engine backing both stores. Every mutation that reads and
/// writes entity state runs under a single write lock, so concurrent
/// requests on the same entity cannot lose each other's effect.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    tweets: RwLock<TweetTable>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryStore {
    fn insert(&self, user: User) -> Result<UserInsert, StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::Poisoned)?;
        if users.values().any(|u| u.email == user.email) {
            return Ok(UserInsert::DuplicateEmail);
        }
        if users.values().any(|u| u.username == user.username) {
            return Ok(UserInsert::DuplicateUsername);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(UserInsert::Created(user))
    }

    fn get(&self, id: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::Poisoned)?;
        Ok(users.get(id).cloned())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::Poisoned)?;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    fn update_profile(
        &self,
        id: &str,
        name: String,
        location: String,
        dob: NaiveDate,
    ) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::Poisoned)?;
        match users.get_mut(id) {
            Some(user) => {
                user.name = name;
                user.location = Some(location);
                user.dob = Some(dob);
                user.updated_at = Utc::now();
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    fn set_profile_pic(&self, id: &str, path: String) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::Poisoned)?;
        match users.get_mut(id) {
            Some(user) => {
                user.profile_pic = Some(path);
                user.updated_at = Utc::now();
                Ok(Some(user.clone()))
            }
            None => Ok(None),
        }
    }

    fn add_follow_edge(&self, follower_id: &str, target_id: &str) -> Result<Update, StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::Poisoned)?;
        if !users.contains_key(follower_id) || !users.contains_key(target_id) {
            return Ok(Update::Missing);
        }
        let already = users
            .get(target_id)
            .map(|u| u.followers.iter().any(|id| id == follower_id))
            .unwrap_or(false);
        if already {
            return Ok(Update::Conflict);
        }
        let now = Utc::now();
        if let Some(target) = users.get_mut(target_id) {
            target.followers.push(follower_id.to_string());
            target.updated_at = now;
        }
        if let Some(follower) = users.get_mut(follower_id) {
            follower.following.push(target_id.to_string());
            follower.updated_at = now;
        }
        Ok(Update::Applied)
    }

    fn remove_follow_edge(&self, follower_id: &str, target_id: &str) -> Result<Update, StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::Poisoned)?;
        if !users.contains_key(target_id) {
            return Ok(Update::Missing);
        }
        let edge_exists = users
            .get(target_id)
            .map(|u| u.followers.iter().any(|id| id == follower_id))
            .unwrap_or(false);
        if !edge_exists {
            return Ok(Update::Conflict);
        }
        let now = Utc::now();
        if let Some(target) = users.get_mut(target_id) {
            target.followers.retain(|id| id != follower_id);
            target.updated_at = now;
        }
        if let Some(follower) = users.get_mut(follower_id) {
            follower.following.retain(|id| id != target_id);
            follower.updated_at = now;
        }
        Ok(Update::Applied)
    }
}

impl TweetStore for MemoryStore {
    fn insert(&self, tweet: Tweet) -> Result<(), StoreError> {
        let mut table = self.tweets.write().map_err(|_| StoreError::Poisoned)?;
        table.order.push(tweet.id.clone());
        table.rows.insert(tweet.id.clone(), tweet);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<Tweet>, StoreError> {
        let table = self.tweets.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table.rows.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Tweet>, StoreError> {
        let table = self.tweets.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table
            .order
            .iter()
            .rev()
            .filter_map(|id| table.rows.get(id))
            .cloned()
            .collect())
    }

    fn list_by_author(&self, author_id: &str) -> Result<Vec<Tweet>, StoreError> {
        let table = self.tweets.read().map_err(|_| StoreError::Poisoned)?;
        Ok(table
            .order
            .iter()
            .rev()
            .filter_map(|id| table.rows.get(id))
            .filter(|t| t.author_id == author_id)
            .cloned()
            .collect())
    }

    fn add_member(
        &self,
        tweet_id: &str,
        set: Engagement,
        user_id: &str,
    ) -> Result<Update, StoreError> {
        let mut table = self.tweets.write().map_err(|_| StoreError::Poisoned)?;
        let Some(tweet) = table.rows.get_mut(tweet_id) else {
            return Ok(Update::Missing);
        };
        let members = match set {
            Engagement::Likes => &mut tweet.likes,
            Engagement::Retweets => &mut tweet.retweet_by,
        };
        if members.iter().any(|id| id == user_id) {
            return Ok(Update::Conflict);
        }
        members.push(user_id.to_string());
        tweet.updated_at = Utc::now();
        Ok(Update::Applied)
    }

    fn remove_member(
        &self,
        tweet_id: &str,
        set: Engagement,
        user_id: &str,
    ) -> Result<Update, StoreError> {
        let mut table = self.tweets.write().map_err(|_| StoreError::Poisoned)?;
        let Some(tweet) = table.rows.get_mut(tweet_id) else {
            return Ok(Update::Missing);
        };
        let members = match set {
            Engagement::Likes => &mut tweet.likes,
            Engagement::Retweets => &mut tweet.retweet_by,
        };
        if !members.iter().any(|id| id == user_id) {
            return Ok(Update::Conflict);
        }
        members.retain(|id| id != user_id);
        tweet.updated_at = Utc::now();
        Ok(Update::Applied)
    }

    fn append_reply(&self, parent_id: &str, reply: Tweet) -> Result<Update, StoreError> {
        let mut table = self.tweets.write().map_err(|_| StoreError::Poisoned)?;
        if !table.rows.contains_key(parent_id) {
            return Ok(Update::Missing);
        }
        let reply_id = reply.id.clone();
        table.order.push(reply_id.clone());
        table.rows.insert(reply_id.clone(), reply);
        if let Some(parent) = table.rows.get_mut(parent_id) {
            parent.replies.push(reply_id);
            parent.updated_at = Utc::now();
        }
        Ok(Update::Applied)
    }

    fn delete_owned(&self, tweet_id: &str, requester_id: &str) -> Result<TweetDelete, StoreError> {
        let mut table = self.tweets.write().map_err(|_| StoreError::Poisoned)?;
        let owned = match table.rows.get(tweet_id) {
            None => return Ok(TweetDelete::Missing),
            Some(tweet) => tweet.author_id == requester_id,
        };
        if !owned {
            return Ok(TweetDelete::NotOwner);
        }
        table.rows.remove(tweet_id);
        table.order.retain(|id| id != tweet_id);
        Ok(TweetDelete::Deleted)
    }
}
