#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header::CONTENT_TYPE},
};
use clap::Parser;
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;

use pulseboard::application::access::AccessControl;
use pulseboard::application::admin_stats::AdminStatsService;
use pulseboard::application::clock::{Clock, FixedClock};
use pulseboard::application::credentials::{CredentialError, CredentialStore};
use pulseboard::application::goal::GoalService;
use pulseboard::application::images::{ImageHost, ImageHostError, ImageUpload, StoredImage};
use pulseboard::application::posts::PostService;
use pulseboard::application::repos::PostsWriteRepo;
use pulseboard::application::users::UserService;
use pulseboard::config::{self, CliArgs, Settings};
use pulseboard::infra::http::{ApiState, HttpState, RouterState, build_router};
use pulseboard::infra::memory::InMemoryRepositories;

pub const MAX_IMAGE_BYTES: u64 = 1024 * 1024;
const BOUNDARY: &str = "pulseboard-test-boundary";

/// Image host that remembers every call and can be told to fail uploads.
#[derive(Default)]
pub struct RecordingImageHost {
    counter: AtomicUsize,
    fail_uploads: AtomicBool,
    pub uploaded: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
}

impl RecordingImageHost {
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn uploaded(&self) -> Vec<String> {
        self.uploaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageHost for RecordingImageHost {
    async fn upload(&self, image: ImageUpload) -> Result<StoredImage, ImageHostError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(ImageHostError::Transport("host unavailable".to_string()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let public_id = format!("img-{n}-{}", image.filename);
        self.uploaded.lock().unwrap().push(public_id.clone());
        Ok(StoredImage {
            url: format!("https://images.test/{public_id}"),
            public_id,
        })
    }

    async fn delete(&self, public_id: &str) -> Result<bool, ImageHostError> {
        self.deleted.lock().unwrap().push(public_id.to_string());
        Ok(true)
    }
}

/// Reversible stand-in so tests do not pay for real password hashing.
pub struct PlainCredentials;

impl CredentialStore for PlainCredentials {
    fn hash(&self, password: &str) -> Result<String, CredentialError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialError> {
        hash.strip_prefix("plain$")
            .map(|stored| stored == password)
            .ok_or_else(|| CredentialError::MalformedHash(hash.to_string()))
    }
}

pub struct TestApp {
    pub router: Router,
    pub images: Arc<RecordingImageHost>,
    pub repo: InMemoryRepositories,
}

fn default_settings() -> Settings {
    config::load(&CliArgs::parse_from(["pulseboard"])).expect("default settings")
}

/// Optional replacements for the default in-memory wiring.
#[derive(Default)]
pub struct Overrides {
    pub posts_writer: Option<Arc<dyn PostsWriteRepo>>,
    pub http: HttpState,
}

/// Application at the given instant, wired with an arbitrary image host.
pub fn app_with_host(
    now: OffsetDateTime,
    host: Arc<dyn ImageHost>,
) -> (Router, InMemoryRepositories) {
    let repo = InMemoryRepositories::new();
    let router = app_with_overrides(now, host, repo.clone(), Overrides::default());
    (router, repo)
}

pub fn app_with_overrides(
    now: OffsetDateTime,
    host: Arc<dyn ImageHost>,
    repo: InMemoryRepositories,
    overrides: Overrides,
) -> Router {
    let settings = default_settings();
    let shared = Arc::new(repo);
    let posts_writer: Arc<dyn PostsWriteRepo> = match overrides.posts_writer {
        Some(writer) => writer,
        None => shared.clone(),
    };
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(now));
    let access = AccessControl::new(shared.clone());

    let api = ApiState {
        goal: Arc::new(GoalService::new(settings.goal.clone(), clock.clone())),
        posts: Arc::new(PostService::new(
            shared.clone(),
            posts_writer,
            access.clone(),
            host,
            clock.clone(),
            MAX_IMAGE_BYTES,
        )),
        users: Arc::new(UserService::new(
            shared.clone(),
            shared.clone(),
            access.clone(),
            Arc::new(PlainCredentials),
            clock.clone(),
        )),
        admin_stats: Arc::new(AdminStatsService::new(
            shared.clone(),
            shared,
            access,
            clock,
            settings.goal.timezone,
        )),
    };

    build_router(
        RouterState {
            http: overrides.http,
            api,
        },
        MAX_IMAGE_BYTES,
    )
}

pub fn app_at(now: OffsetDateTime) -> TestApp {
    let images = Arc::new(RecordingImageHost::default());
    let (router, repo) = app_with_host(now, images.clone());
    TestApp {
        router,
        images,
        repo,
    }
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub async fn send(router: &Router, request: Request<Body>) -> Reply {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    Reply {
        status,
        headers,
        body,
    }
}

pub async fn get(router: &Router, uri: &str) -> Reply {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, request).await
}

pub async fn put(router: &Router, uri: &str) -> Reply {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

pub async fn delete(router: &Router, uri: &str) -> Reply {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

pub async fn json(router: &Router, method: Method, uri: &str, body: Value) -> Reply {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

pub struct FilePart<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

pub fn png() -> FilePart<'static> {
    FilePart {
        filename: "photo.png",
        content_type: "image/png",
        data: b"\x89PNG\r\n\x1a\n",
    }
}

fn multipart_body(fields: &[(&str, &str)], file: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.filename, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn multipart(
    router: &Router,
    method: Method,
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<FilePart<'_>>,
) -> Reply {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, file)))
        .unwrap();
    send(router, request).await
}

/// Registers an account and returns its id.
pub async fn register(router: &Router, username: &str) -> String {
    let reply = json(
        router,
        Method::POST,
        "/api/auth/register",
        serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret-password",
        }),
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.body);
    reply.body["user"]["id"].as_str().unwrap().to_string()
}

/// Creates a post and returns its JSON view.
pub async fn create_post(
    router: &Router,
    author_id: &str,
    title: &str,
    file: Option<FilePart<'_>>,
) -> Value {
    let reply = multipart(
        router,
        Method::POST,
        "/api/posts",
        &[
            ("title", title),
            ("content", "Body text"),
            ("author_id", author_id),
        ],
        file,
    )
    .await;
    assert_eq!(reply.status, StatusCode::CREATED, "{:?}", reply.body);
    reply.body["post"].clone()
}

pub async fn promote(router: &Router, target_id: &str, admin_id: &str) {
    let reply = json(
        router,
        Method::PUT,
        &format!("/api/users/{target_id}/role"),
        serde_json::json!({ "role": "ADMIN", "adminId": admin_id }),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "{:?}", reply.body);
}
