//! Response simulator: delays matched requests and answers them from the fixture store.
//!
//! The store is owned by a single worker task. Requests are decoded at
//! submission, queued with a deadline, and applied strictly in submission
//! order once their deadline passes. Responses come back through a
//! [`PendingResponse`]. There is no cancellation: dropping the pending
//! response does not stop the mutation from happening.

use core::result::Result as CoreResult;

use facepalm_core::{
    CommentResponse, FixtureStore, LoginRequest, LoginResponse, MockConfig, NewComment, NewPost,
    PostResponse, PostsResponse, RegisterRequest, RegisterResponse, Session, SimulatedLatency,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{Error, MockError, Result};
use crate::router::{Method, Route, RouteMatcher};

/// Content type attached to every simulated response.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// An outgoing request offered to the interceptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockRequest {
    /// Request method
    pub method: Method,
    /// Full request URL or path
    pub url: String,
    /// Raw request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl MockRequest {
    /// Creates a request without a body.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
        }
    }

    /// Creates a `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    /// Creates a `POST` request with a raw body.
    #[must_use]
    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: Some(body.into()),
        }
    }

    /// Creates a `POST` request with a JSON-serialized body.
    ///
    /// # Errors
    /// Returns an error if `body` cannot be serialized
    pub fn post_json<T: Serialize>(url: impl Into<String>, body: &T) -> Result<Self> {
        Ok(Self::post(url, serde_json::to_string(body)?))
    }
}

/// A fabricated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Serialized JSON body
    pub body: String,
}

impl MockResponse {
    /// A `200` response carrying `payload`.
    fn ok<T: Serialize>(payload: &T) -> Self {
        match serde_json::to_string(payload) {
            Ok(body) => Self::with_body(200, body),
            Err(error) => {
                warn!("Failed to serialize response body: {error}");
                Self::with_body(500, r#"{"error":"Internal Server Error"}"#.to_owned())
            }
        }
    }

    /// The response describing `error`.
    fn failure(error: &MockError) -> Self {
        let body = serde_json::to_string(&error.body())
            .unwrap_or_else(|_| format!(r#"{{"error":"{}"}}"#, error.reason()));
        Self::with_body(error.status(), body)
    }

    fn with_body(status: u16, body: String) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_owned(), JSON_CONTENT_TYPE.to_owned())],
            body,
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Looks up a header value, ignoring name case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parses the body as arbitrary JSON.
    ///
    /// # Errors
    /// Returns an error if the body is not valid JSON
    pub fn json(&self) -> Result<JsonValue> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Parses the body into a typed schema.
    ///
    /// # Errors
    /// Returns an error if the body does not match `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// A response that will be delivered once the simulated latency elapses.
#[derive(Debug)]
pub struct PendingResponse {
    receiver: oneshot::Receiver<MockResponse>,
}

impl PendingResponse {
    /// Waits for the response.
    ///
    /// # Errors
    /// Returns an error if the worker stopped before answering
    pub async fn wait(self) -> Result<MockResponse> {
        self.receiver
            .await
            .map_err(|_| Error::WorkerClosed("Request"))
    }
}

/// Outcome of offering a request to the interceptor.
#[derive(Debug)]
pub enum Interception {
    /// The request matched a route; its response is on the way
    Pending(PendingResponse),
    /// No route matched; the request should proceed to the real network
    PassThrough,
}

/// A decoded request ready to run against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Operation {
    Register(RegisterRequest),
    Login(LoginRequest),
    ListPosts,
    CreatePost(NewPost),
    GetPost(u64),
    AddComment(u64, NewComment),
}

impl Operation {
    /// Validates the body against the schema of `route`.
    fn decode(route: Route, body: Option<&str>) -> CoreResult<Self, MockError> {
        Ok(match route {
            Route::Register => Self::Register(parse_body(body)?),
            Route::Login => Self::Login(parse_body(body)?),
            Route::ListPosts => Self::ListPosts,
            Route::CreatePost => Self::CreatePost(parse_body(body)?),
            Route::GetPost(id) => Self::GetPost(id),
            Route::AddComment(post_id) => Self::AddComment(post_id, parse_body(body)?),
        })
    }

    /// Runs the operation. Failures leave the store untouched.
    fn apply(self, store: &mut FixtureStore) -> MockResponse {
        match self {
            Self::Register(registration) => {
                if store.username_taken(&registration.username) {
                    return MockResponse::failure(&MockError::Conflict(registration.username));
                }
                let user = store.insert_user(registration);
                MockResponse::ok(&RegisterResponse {
                    status: "success".to_owned(),
                    user: user.profile(),
                })
            }
            Self::Login(login) => store
                .authenticate(&login.username, &login.password, login.remember_me)
                .map_or_else(
                    || {
                        warn!("401 Unauthorized for {}", login.username);
                        MockResponse::failure(&MockError::Unauthorized)
                    },
                    |user| {
                        MockResponse::ok(&LoginResponse {
                            session: Session { user },
                        })
                    },
                ),
            Self::ListPosts => MockResponse::ok(&PostsResponse {
                posts: store.list_posts(),
            }),
            Self::CreatePost(new_post) => MockResponse::ok(&PostResponse {
                post: store.insert_post(new_post),
            }),
            Self::GetPost(id) => store.find_post(id).map_or_else(
                || {
                    warn!("Post {id} not found");
                    MockResponse::failure(&MockError::NotFound)
                },
                |post| MockResponse::ok(&PostResponse { post: post.clone() }),
            ),
            Self::AddComment(post_id, new_comment) => store
                .insert_comment(post_id, new_comment)
                .map_or_else(
                    || {
                        warn!("Cannot comment on missing post {post_id}");
                        MockResponse::failure(&MockError::NotFound)
                    },
                    |(post, comment)| MockResponse::ok(&CommentResponse { post, comment }),
                ),
        }
    }
}

fn parse_body<T: DeserializeOwned>(body: Option<&str>) -> CoreResult<T, MockError> {
    let raw = body.ok_or_else(|| MockError::Malformed("missing request body".to_owned()))?;
    Ok(serde_json::from_str(raw)?)
}

/// A queued request.
struct Job {
    deadline: Instant,
    route: Route,
    operation: CoreResult<Operation, MockError>,
    reply: oneshot::Sender<MockResponse>,
}

/// Handle to the mock backend.
///
/// Cloning the handle shares the same worker and store.
#[derive(Debug, Clone)]
pub struct MockBackend {
    matcher: RouteMatcher,
    latency: SimulatedLatency,
    jobs: mpsc::UnboundedSender<Job>,
}

impl MockBackend {
    /// Spawns the worker owning `store` on the current tokio runtime.
    ///
    /// # Errors
    /// Returns an error if the route patterns fail to compile
    pub fn spawn(store: FixtureStore, latency: SimulatedLatency) -> Result<Self> {
        let (backend, worker) = Self::with_worker(store, latency)?;
        drop(worker);
        Ok(backend)
    }

    /// Spawns a backend configured from `config`.
    ///
    /// # Errors
    /// Returns an error if the route patterns fail to compile
    pub fn from_config(config: &MockConfig) -> Result<Self> {
        let store = if config.seed_fixtures {
            FixtureStore::seeded()
        } else {
            FixtureStore::empty()
        };
        Self::spawn(store, config.latency())
    }

    /// Like [`MockBackend::spawn`], also returning the worker handle.
    ///
    /// The worker finishes, yielding the store, once every backend handle is dropped.
    ///
    /// # Errors
    /// Returns an error if the route patterns fail to compile
    pub fn with_worker(
        store: FixtureStore,
        latency: SimulatedLatency,
    ) -> Result<(Self, JoinHandle<FixtureStore>)> {
        let matcher = RouteMatcher::new()?;
        let (jobs, queue) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(store, queue));
        debug!("Mock backend started with {:?} latency", latency.delay());
        Ok((
            Self {
                matcher,
                latency,
                jobs,
            },
            worker,
        ))
    }

    /// Offers `request` to the interceptor without waiting.
    ///
    /// Matched requests are queued immediately, so submission order is response order.
    ///
    /// # Errors
    /// Returns an error if the worker has shut down
    pub fn submit(&self, request: &MockRequest) -> Result<Interception> {
        let Some(route) = self.matcher.match_request(request.method, &request.url) else {
            return Ok(Interception::PassThrough);
        };

        let (reply, receiver) = oneshot::channel();
        let job = Job {
            deadline: self.latency.deadline(),
            route,
            operation: Operation::decode(route, request.body.as_deref()),
            reply,
        };
        self.jobs
            .send(job)
            .map_err(|_| Error::WorkerClosed("Request"))?;

        Ok(Interception::Pending(PendingResponse { receiver }))
    }

    /// Offers `request` and waits for the simulated response.
    ///
    /// Returns `None` when the request is not intercepted.
    ///
    /// # Errors
    /// Returns an error if the worker has shut down
    pub async fn intercept(&self, request: &MockRequest) -> Result<Option<MockResponse>> {
        match self.submit(request)? {
            Interception::Pending(pending) => pending.wait().await.map(Some),
            Interception::PassThrough => Ok(None),
        }
    }
}

async fn run_worker(mut store: FixtureStore, mut queue: mpsc::UnboundedReceiver<Job>) -> FixtureStore {
    while let Some(job) = queue.recv().await {
        SimulatedLatency::wait_until(job.deadline).await;

        let response = match job.operation {
            Ok(operation) => operation.apply(&mut store),
            Err(error) => {
                warn!("Rejected {} request: {error}", job.route.name());
                MockResponse::failure(&error)
            }
        };
        debug!("{} -> {}", job.route.name(), response.status);

        if job.reply.send(response).is_err() {
            debug!("Caller dropped {} response", job.route.name());
        }
    }
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use facepalm_core::ErrorBody;

    fn backend() -> Result<MockBackend> {
        MockBackend::spawn(FixtureStore::seeded(), SimulatedLatency::from_millis(400))
    }

    #[test]
    fn test_decode_rejects_missing_body() {
        let decoded = Operation::decode(Route::Login, None);
        assert!(matches!(decoded, Err(MockError::Malformed(_))));
    }

    #[test]
    fn test_decode_rejects_schema_mismatch() {
        let decoded = Operation::decode(Route::CreatePost, Some(r#"{"title":5}"#));
        assert!(matches!(decoded, Err(MockError::Malformed(_))));
    }

    #[test]
    fn test_decode_get_routes_ignore_body() {
        let decoded = Operation::decode(Route::GetPost(1), Some("garbage"));
        assert_eq!(decoded, Ok(Operation::GetPost(1)));
    }

    #[test]
    fn test_failure_response_shape() -> Result<()> {
        let response = MockResponse::failure(&MockError::NotFound);
        assert_eq!(response.status, 404);
        assert_eq!(response.header("content-type"), Some(JSON_CONTENT_TYPE));
        let body: ErrorBody = response.decode()?;
        assert_eq!(body.error, "Not Found");
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_waits_for_latency() -> Result<()> {
        let backend = backend()?;
        let start = Instant::now();
        let response = backend.intercept(&MockRequest::get("/api/posts")).await?;
        assert!(start.elapsed() >= Duration::from_millis(400));
        assert_eq!(response.map(|resp| resp.status), Some(200));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_pass_through_is_immediate() -> Result<()> {
        let backend = backend()?;
        let start = Instant::now();
        let response = backend.intercept(&MockRequest::get("/api/users")).await?;
        assert!(response.is_none());
        assert_eq!(start.elapsed(), Duration::ZERO);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_body_is_bad_request() -> Result<()> {
        let backend = backend()?;
        let response = backend
            .intercept(&MockRequest::post("/api/auth/login", "not json"))
            .await?;
        assert_eq!(response.map(|resp| resp.status), Some(400));
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_returns_store_on_shutdown() -> anyhow::Result<()> {
        let (backend, worker) =
            MockBackend::with_worker(FixtureStore::empty(), SimulatedLatency::none())?;
        let request = MockRequest::post("/posts", r#"{"title":"t","body":"b"}"#);
        backend.intercept(&request).await?;
        drop(backend);

        let store = worker.await?;
        assert_eq!(store.list_posts().len(), 1);
        Ok(())
    }
}
