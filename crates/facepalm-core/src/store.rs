//! In-memory fixture collections standing in for a real backend.
//!
//! The store is an explicit value: whoever owns it is the single writer.
//! Identifiers come from per-entity [`IdSequence`]s and are never reused.

use core::cmp::Reverse;

use tracing::info;

use crate::types::{Comment, NewComment, NewPost, Post, RegisterRequest, User, UserProfile};

/// Monotonic identifier allocator for one entity type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdSequence {
    last: u64,
}

impl IdSequence {
    /// Creates a sequence whose next identifier is `last + 1`.
    #[must_use]
    pub const fn starting_after(last: u64) -> Self {
        Self { last }
    }

    /// Allocates the next identifier.
    pub fn next_id(&mut self) -> u64 {
        self.last = self.last.saturating_add(1);
        self.last
    }
}

/// Users, posts and comments held for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct FixtureStore {
    users: Vec<User>,
    posts: Vec<Post>,
    user_ids: IdSequence,
    post_ids: IdSequence,
    comment_ids: IdSequence,
}

impl FixtureStore {
    /// Creates a store without any fixtures.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a store holding the demo fixtures: one test user and two posts.
    #[must_use]
    pub fn seeded() -> Self {
        let users = vec![User {
            id: 1,
            name: "Mr. Test".to_owned(),
            username: "test".to_owned(),
            email: "test@test.com".to_owned(),
            password: "test".to_owned(),
            phone_number: None,
            remember_me: false,
        }];

        let posts = vec![
            Post {
                id: 1,
                title: "What is the facepalm?".to_owned(),
                body: "A facepalm is the physical gesture of placing one's hand across one's face \
                       or lowering one's face into one's hand or hands, covering or closing one's eyes."
                    .to_owned(),
                comments: vec![
                    Comment {
                        id: 2,
                        post_id: 1,
                        email: "info@spam.org".to_owned(),
                        body: "Buy potatoes online. Delivery next day.".to_owned(),
                    },
                    Comment {
                        id: 1,
                        post_id: 1,
                        email: "facepalm@test.com".to_owned(),
                        body: "Thanks for this information. I would just like to mention here the \
                               double facepalm, which is similar to the facepalm but performed with \
                               two hands. Keep up the good work!"
                            .to_owned(),
                    },
                ],
            },
            Post {
                id: 2,
                title: "Online use of the facepalm".to_owned(),
                body: "Use of the gesture is not limited to visual representations. Often just the \
                       word, facepalm, is used to show someone's disapproval or embarrassment."
                    .to_owned(),
                comments: Vec::new(),
            },
        ];

        Self {
            users,
            posts,
            user_ids: IdSequence::starting_after(1),
            post_ids: IdSequence::starting_after(2),
            comment_ids: IdSequence::starting_after(2),
        }
    }

    /// Finds the first user matching `predicate`.
    pub fn find_user<P>(&self, predicate: P) -> Option<&User>
    where
        P: Fn(&User) -> bool,
    {
        self.users.iter().find(|user| predicate(user))
    }

    /// Finds the first user matching `predicate` for mutation.
    pub fn find_user_mut<P>(&mut self, predicate: P) -> Option<&mut User>
    where
        P: Fn(&User) -> bool,
    {
        self.users.iter_mut().find(|user| predicate(user))
    }

    /// Whether a user with `username` already exists.
    #[must_use]
    pub fn username_taken(&self, username: &str) -> bool {
        self.find_user(|user| user.username == username).is_some()
    }

    /// Registers a new user under the next identifier.
    ///
    /// Newly registered users never start with remember-me set.
    pub fn insert_user(&mut self, registration: RegisterRequest) -> User {
        let user = User {
            id: self.user_ids.next_id(),
            name: registration.name,
            username: registration.username,
            email: registration.email,
            password: registration.password,
            phone_number: registration.phone_number,
            remember_me: false,
        };
        info!("Registered user {} ({})", user.id, user.username);
        self.users.push(user.clone());
        user
    }

    /// Checks credentials and records the remember-me choice on success.
    pub fn authenticate(
        &mut self,
        username: &str,
        password: &str,
        remember_me: bool,
    ) -> Option<UserProfile> {
        let user =
            self.find_user_mut(|user| user.username == username && user.password == password)?;
        user.remember_me = remember_me;
        info!("User {} logged in (remember_me={remember_me})", user.id);
        Some(user.profile())
    }

    /// All posts, newest first.
    #[must_use]
    pub fn list_posts(&self) -> Vec<Post> {
        let mut posts = self.posts.clone();
        posts.sort_by_key(|post| Reverse(post.id));
        posts
    }

    /// Looks up a post by identifier.
    #[must_use]
    pub fn find_post(&self, id: u64) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    /// Creates a post with an empty comment list.
    pub fn insert_post(&mut self, new_post: NewPost) -> Post {
        let post = Post {
            id: self.post_ids.next_id(),
            title: new_post.title,
            body: new_post.body,
            comments: Vec::new(),
        };
        info!("Created post {}", post.id);
        self.posts.push(post.clone());
        post
    }

    /// Prepends a comment to the post `post_id`.
    ///
    /// Returns the updated post and the new comment, or `None` without
    /// consuming an identifier when the post does not exist.
    pub fn insert_comment(
        &mut self,
        post_id: u64,
        new_comment: NewComment,
    ) -> Option<(Post, Comment)> {
        let post = self.posts.iter_mut().find(|post| post.id == post_id)?;
        let comment = Comment {
            id: self.comment_ids.next_id(),
            post_id,
            email: new_comment.email,
            body: new_comment.body,
        };
        post.comments.insert(0, comment.clone());
        info!("Added comment {} to post {post_id}", comment.id);
        Some((post.clone(), comment))
    }
}
