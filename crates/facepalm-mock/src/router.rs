//! Route matching for intercepted requests.
//!
//! Fixed routes match by path suffix, parameterised routes by regular
//! expression with a captured identifier. Anything else is not intercepted.

use core::fmt;
use core::result::Result as CoreResult;
use core::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// HTTP request method.
///
/// Decoding accepts any letter case; encoding always yields upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

impl Method {
    /// Canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> CoreResult<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            other => Err(format!("unsupported method: {other}")),
        }
    }
}

impl TryFrom<String> for Method {
    type Error = String;

    fn try_from(value: String) -> CoreResult<Self, Self::Error> {
        value.parse()
    }
}

/// A fixture operation selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `POST .../auth/register`
    Register,
    /// `POST .../auth/login`
    Login,
    /// `GET .../posts`
    ListPosts,
    /// `POST .../posts`
    CreatePost,
    /// `GET .../posts/{id}`
    GetPost(u64),
    /// `POST .../posts/{id}/comments`
    AddComment(u64),
}

impl Route {
    /// Short label used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::ListPosts => "list-posts",
            Self::CreatePost => "create-post",
            Self::GetPost(_) => "get-post",
            Self::AddComment(_) => "add-comment",
        }
    }
}

/// Maps a method and URL to a [`Route`].
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    /// Matches `posts/{id}` at the end of a path
    post_pattern: Regex,
    /// Matches `posts/{id}/comments` at the end of a path
    comments_pattern: Regex,
}

impl RouteMatcher {
    /// Compiles the parameterised route patterns.
    ///
    /// # Errors
    /// Returns an error if a route pattern fails to compile
    pub fn new() -> Result<Self> {
        Ok(Self {
            post_pattern: Regex::new(r"posts/(\d+)$")?,
            comments_pattern: Regex::new(r"posts/(\d+)/comments$")?,
        })
    }

    /// Selects the route for `method` and `url`, or `None` to pass the request through.
    pub fn match_request(&self, method: Method, url: &str) -> Option<Route> {
        let path = strip_query(url);

        let route = match method {
            Method::Post if path.ends_with("auth/register") => Some(Route::Register),
            Method::Post if path.ends_with("auth/login") => Some(Route::Login),
            Method::Get if path.ends_with("posts") => Some(Route::ListPosts),
            Method::Post if path.ends_with("posts") => Some(Route::CreatePost),
            Method::Get => Self::capture_id(&self.post_pattern, path).map(Route::GetPost),
            Method::Post => Self::capture_id(&self.comments_pattern, path).map(Route::AddComment),
            Method::Put | Method::Patch | Method::Delete | Method::Head | Method::Options => None,
        };

        debug!(
            "{method} {url} -> {}",
            route.as_ref().map_or("pass-through", Route::name)
        );

        route
    }

    /// Extracts the captured identifier.
    ///
    /// Digit runs beyond `u64` saturate; such ids are never issued and resolve to Not-Found.
    fn capture_id(pattern: &Regex, path: &str) -> Option<u64> {
        let captures = pattern.captures(path)?;
        let digits = captures.get(1)?.as_str();
        Some(digits.parse().unwrap_or(u64::MAX))
    }
}

/// Drops any query string or fragment from `url`.
fn strip_query(url: &str) -> &str {
    url.find(['?', '#']).map_or(url, |end| &url[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_routes() -> Result<()> {
        let matcher = RouteMatcher::new()?;
        assert_eq!(
            matcher.match_request(Method::Post, "/api/auth/register"),
            Some(Route::Register)
        );
        assert_eq!(
            matcher.match_request(Method::Post, "https://example.com/auth/login"),
            Some(Route::Login)
        );
        assert_eq!(matcher.match_request(Method::Get, "/api/posts"), Some(Route::ListPosts));
        assert_eq!(matcher.match_request(Method::Post, "/api/posts"), Some(Route::CreatePost));
        Ok(())
    }

    #[test]
    fn test_parameterised_routes() -> Result<()> {
        let matcher = RouteMatcher::new()?;
        assert_eq!(matcher.match_request(Method::Get, "/api/posts/12"), Some(Route::GetPost(12)));
        assert_eq!(
            matcher.match_request(Method::Post, "/api/posts/3/comments"),
            Some(Route::AddComment(3))
        );
        Ok(())
    }

    #[test]
    fn test_method_mismatch_passes_through() -> Result<()> {
        let matcher = RouteMatcher::new()?;
        assert_eq!(matcher.match_request(Method::Get, "/api/auth/login"), None);
        assert_eq!(matcher.match_request(Method::Post, "/api/posts/12"), None);
        assert_eq!(matcher.match_request(Method::Get, "/api/posts/3/comments"), None);
        assert_eq!(matcher.match_request(Method::Delete, "/api/posts/3"), None);
        Ok(())
    }

    #[test]
    fn test_unknown_paths_pass_through() -> Result<()> {
        let matcher = RouteMatcher::new()?;
        assert_eq!(matcher.match_request(Method::Get, "/api/users"), None);
        assert_eq!(matcher.match_request(Method::Get, "/api/posts/abc"), None);
        assert_eq!(matcher.match_request(Method::Post, "/api/auth/logout"), None);
        Ok(())
    }

    #[test]
    fn test_query_string_ignored() -> Result<()> {
        let matcher = RouteMatcher::new()?;
        assert_eq!(
            matcher.match_request(Method::Get, "/api/posts?page=2"),
            Some(Route::ListPosts)
        );
        assert_eq!(
            matcher.match_request(Method::Get, "/api/posts/4#top"),
            Some(Route::GetPost(4))
        );
        Ok(())
    }

    #[test]
    fn test_oversized_id_saturates() -> Result<()> {
        let matcher = RouteMatcher::new()?;
        assert_eq!(
            matcher.match_request(Method::Get, "/posts/99999999999999999999999"),
            Some(Route::GetPost(u64::MAX))
        );
        Ok(())
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("post".parse::<Method>(), Ok(Method::Post));
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
        assert!(matches!("BREW".parse::<Method>(), Err(message) if message.contains("BREW")));
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }

    #[test]
    fn test_method_serde_accepts_any_case() -> serde_json::Result<()> {
        assert_eq!(serde_json::from_str::<Method>(r#""post""#)?, Method::Post);
        assert_eq!(serde_json::from_str::<Method>(r#""Delete""#)?, Method::Delete);
        assert!(matches!(serde_json::from_str::<Method>(r#""BREW""#), Err(_)));
        assert_eq!(serde_json::to_string(&Method::Get)?, r#""GET""#);
        Ok(())
    }
}
