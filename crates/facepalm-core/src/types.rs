//! Data model and the JSON schemas exchanged with the interceptor.
//!
//! Field names follow the camelCase convention of the browser app that
//! consumes these payloads.

use serde::{Deserialize, Serialize};

/// A registered account as held by the fixture store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique, monotonically assigned identifier
    pub id: u64,
    /// Display name
    pub name: String,
    /// Unique login name
    pub username: String,
    /// Contact address
    pub email: String,
    /// Plain-text password (fixtures only, never echoed back)
    pub password: String,
    /// Optional phone number supplied at registration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Whether the last login asked for durable session storage
    pub remember_me: bool,
}

impl User {
    /// Projects the user into the password-free view sent to clients.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            remember_me: self.remember_me,
        }
    }
}

/// Public view of a [`User`], as carried by responses and sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User identifier
    pub id: u64,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Login name
    pub username: String,
    /// Contact address
    #[serde(default)]
    pub email: String,
    /// Optional phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Remember-me flag selecting durable session storage
    #[serde(default)]
    pub remember_me: bool,
}

/// A blog post together with its comments, newest comment first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique post identifier
    pub id: u64,
    /// Post title
    pub title: String,
    /// Post body
    pub body: String,
    /// Comments, most recent first
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// A comment attached to a [`Post`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique comment identifier
    pub id: u64,
    /// Identifier of the parent post
    pub post_id: u64,
    /// Author address
    pub email: String,
    /// Comment text
    pub body: String,
}

/// Logged-in state handed to the application and persisted by the session bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The authenticated user
    pub user: UserProfile,
}

impl Session {
    /// Whether this session should outlive the browsing session.
    #[must_use]
    pub fn remember_me(&self) -> bool {
        self.user.remember_me
    }
}

/// Body of `POST .../auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Requested login name
    pub username: String,
    /// Contact address
    #[serde(default)]
    pub email: String,
    /// Chosen password
    pub password: String,
    /// Optional phone number
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Body of `POST .../auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
    /// Persist the session durably
    #[serde(default)]
    pub remember_me: bool,
}

/// Body of `POST .../posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    /// Post title
    pub title: String,
    /// Post body
    pub body: String,
}

/// Body of `POST .../posts/{id}/comments`.
///
/// The parent post is taken from the URL; a `postId` field in the body is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    /// Author address
    pub email: String,
    /// Comment text
    pub body: String,
}

/// Success body of the register route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Always `"success"`
    pub status: String,
    /// The newly created user
    pub user: UserProfile,
}

/// Success body of the login route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The established session
    pub session: Session,
}

/// Success body of the post listing route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostsResponse {
    /// Posts, newest first
    pub posts: Vec<Post>,
}

/// Success body of the post creation and lookup routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostResponse {
    /// The requested or created post
    pub post: Post,
}

/// Success body of the comment route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentResponse {
    /// The parent post including the new comment
    pub post: Post,
    /// The created comment
    pub comment: Comment,
}

/// Error body shared by all failing routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason phrase
    pub error: String,
}
