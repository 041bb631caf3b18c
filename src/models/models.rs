use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_pic: Option<String>,
    pub location: Option<String>,
    pub dob: Option<NaiveDate>,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        User {
            id: Uuid::new_v4().to_string(),
            name,
            username,
            email,
            password: password_hash,
            profile_pic: None,
            location: None,
            dob: None,
            followers: Vec::new(),
            following: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Full profile as exposed to clients. Never carries the password hash.
#[derive(Serialize, Clone)]
pub struct PublicProfile {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub profile_pic: Option<String>,
    pub location: Option<String>,
    pub dob: Option<NaiveDate>,
    pub followers: Vec<String>,
    pub following: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        PublicProfile {
            id: user.id.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            profile_pic: user.profile_pic.clone(),
            location: user.location.clone(),
            dob: user.dob,
            followers: user.followers.clone(),
            following: user.following.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Short form embedded when hydrating likes, retweets and reply authors.
#[derive(Serialize, Clone)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub username: String,
    pub profile_pic: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        UserSummary {
            id: user.id.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            profile_pic: user.profile_pic.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Tweet {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub image: Option<String>,
    pub likes: Vec<String>,
    pub retweet_by: Vec<String>,
    pub replies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tweet {
    pub fn new(author_id: String, content: String, image: Option<String>) -> Self {
        let now = Utc::now();
        Tweet {
            id: Uuid::new_v4().to_string(),
            content,
            author_id,
            image,
            likes: Vec::new(),
            retweet_by: Vec::new(),
            replies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
