use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    Json, Router,
    body::Body,
    extract::{ConnectInfo, Path},
    http::{HeaderMap, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::Url;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_cookies::{Cookie, Key};

use ofsted_prep::{
    build_router,
    config::{Config, LoginRateLimit, session_key_from_secret},
    services::session_store::{TOKEN_KEY, USER_KEY, encode_cookie_value},
    state::AppState,
};

const SESSION_SECRET: &str =
    "test-session-secret-that-is-long-enough-to-sign-cookies-0123456789";

fn session_key() -> Key {
    session_key_from_secret(SESSION_SECRET).unwrap()
}

// Shared test context
struct TestContext {
    app: Router,
    backend_url: Url,
}

/// A stand-in for the REST backend.
fn mock_backend() -> Router {
    async fn login(Json(body): Json<Value>) -> Response {
        let email = body["email"].as_str().unwrap_or_default();
        let password = body["password"].as_str().unwrap_or_default();

        let role = match (email, password) {
            ("admin@home.org", "correct-horse") => "admin",
            ("staff@home.org", "correct-horse") => "staff",
            ("inspector@home.org", "correct-horse") => "readonly",
            ("broken@home.org", _) => {
                return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
            }
            _ => {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Invalid credentials" })),
                )
                    .into_response();
            }
        };

        Json(json!({
            "token": format!("tok-{}", role),
            "user": {
                "id": format!("id-{}", role),
                "name": format!("The {}", role),
                "email": email,
                "role": role,
                "status": "active"
            }
        }))
        .into_response()
    }

    async fn profile(Path(id): Path<String>, headers: HeaderMap) -> Response {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if auth != "Bearer tok-admin" {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "jwt expired" })))
                .into_response();
        }

        Json(json!({
            "name": format!("Renamed {}", id),
            "email": "admin@home.org",
            "role": "admin",
            "joinDate": "2024-01-01",
            "lastLogin": null
        }))
        .into_response()
    }

    Router::new()
        .route("/auth/login", post(login))
        .route("/profile/{id}", get(profile))
}

impl TestContext {
    async fn new() -> Self {
        Self::with_rate_limit(None).await
    }

    async fn with_rate_limit(login_rate_limit: Option<LoginRateLimit>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, mock_backend()).await.unwrap();
        });

        let backend_url = Url::parse(&format!("http://{}", addr)).unwrap();
        let config = Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            backend_url: backend_url.clone(),
            session_duration_days: 7,
            session_key: session_key(),
            secure_cookies: false,
            login_rate_limit,
            cors_origins: vec!["http://localhost:3000".to_string()],
        };

        let state = AppState::new(&config).unwrap();

        Self {
            app: build_router(state),
            backend_url,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, path: &str, jar: &CookieJar) -> Response {
        let request = Request::get(path)
            .header(header::COOKIE, jar.header())
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn post_json(&self, path: &str, jar: &CookieJar, body: Value) -> Response {
        let request = Request::post(path)
            .header(header::COOKIE, jar.header())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn post_empty(&self, path: &str, jar: &CookieJar) -> Response {
        let request = Request::post(path)
            .header(header::COOKIE, jar.header())
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }
}

/// A minimal browser cookie jar.
#[derive(Default)]
struct CookieJar {
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    /// Seeds a session signed with `key`, as the server would write it.
    fn with_session_signed_by(key: &Key, token: &str, user: Value) -> Self {
        let mut jar = Self::default();
        jar.sign(key, TOKEN_KEY, token);
        jar.sign(key, USER_KEY, &user.to_string());
        jar
    }

    /// Stores `value` under `name`, encoded and signed with `key`.
    fn sign(&mut self, key: &Key, name: &str, value: &str) {
        let mut signer = tower_cookies::cookie::CookieJar::new();
        signer
            .signed_mut(key)
            .add(Cookie::new(name.to_string(), encode_cookie_value(value)));
        let signed = signer.get(name).unwrap().value().to_string();
        self.cookies.insert(name.to_string(), signed);
    }

    fn with_session(token: &str, user: Value) -> Self {
        Self::with_session_signed_by(&session_key(), token, user)
    }

    /// Seeds a session the way a client could write it by hand.
    fn with_unsigned_session(token: &str, user: Value) -> Self {
        let mut jar = Self::default();
        jar.cookies.insert(TOKEN_KEY.to_string(), encode_cookie_value(token));
        jar.cookies
            .insert(USER_KEY.to_string(), encode_cookie_value(&user.to_string()));
        jar
    }

    fn for_role(role: &str) -> Self {
        Self::with_session(
            &format!("tok-{}", role),
            json!({
                "id": format!("id-{}", role),
                "name": format!("The {}", role),
                "email": format!("{}@home.org", role),
                "role": role
            }),
        )
    }

    fn header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn absorb(&mut self, response: &Response) {
        for set_cookie in response.headers().get_all(header::SET_COOKIE) {
            let set_cookie = set_cookie.to_str().unwrap();
            let pair = set_cookie.split(';').next().unwrap();
            let (name, value) = pair.split_once('=').unwrap();
            let removed = value.is_empty() || set_cookie.contains("Max-Age=0");
            if removed {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }
    }
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect without Location")
        .to_str()
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

const PROTECTED_PATHS: [&str; 10] = [
    "/",
    "/audit-checklist",
    "/staff-compliance",
    "/policies",
    "/alerts",
    "/reports",
    "/settings",
    "/user-management",
    "/activity-logs",
    "/profile",
];

#[tokio::test]
async fn anonymous_navigation_redirects_to_login() {
    let context = TestContext::new().await;
    let jar = CookieJar::default();

    for path in PROTECTED_PATHS {
        let response = context.get(path, &jar).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {}", path);
        assert_eq!(location(&response), "/login", "path {}", path);
    }
}

#[tokio::test]
async fn staff_is_redirected_home_from_admin_pages() {
    let context = TestContext::new().await;
    let jar = CookieJar::for_role("staff");

    for path in ["/user-management", "/settings", "/activity-logs", "/reports"] {
        let response = context.get(path, &jar).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "path {}", path);
        assert_eq!(location(&response), "/", "path {}", path);
    }

    let response = context.get("/staff-compliance", &jar).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("<h1>Staff Compliance</h1>"));
    assert!(!html.contains("/user-management"));
}

#[tokio::test]
async fn admin_renders_every_page() {
    let context = TestContext::new().await;
    let jar = CookieJar::for_role("admin");

    for path in PROTECTED_PATHS {
        let response = context.get(path, &jar).await;
        assert_eq!(response.status(), StatusCode::OK, "path {}", path);
    }
}

#[tokio::test]
async fn corrupted_session_cookies_read_as_signed_out() {
    let context = TestContext::new().await;

    let mut unparseable = CookieJar::for_role("admin");
    unparseable.sign(&session_key(), USER_KEY, "{\"id\": oops");

    let mut not_encoded = CookieJar::for_role("admin");
    not_encoded
        .cookies
        .insert(USER_KEY.to_string(), "%%%".to_string());

    let mut token_only = CookieJar::for_role("admin");
    token_only.cookies.remove(USER_KEY);

    let unknown_role = CookieJar::with_session(
        "tok",
        json!({ "id": "1", "name": "X", "email": "x@y.z", "role": "owner" }),
    );

    for jar in [unparseable, not_encoded, token_only, unknown_role] {
        let response = context.get("/", &jar).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn forged_session_cookies_are_not_trusted() {
    let context = TestContext::new().await;
    let admin = json!({
        "id": "id-admin",
        "name": "Mallory",
        "email": "mallory@home.org",
        "role": "admin"
    });

    let unsigned = CookieJar::with_unsigned_session("anything", admin.clone());
    let other_key = Key::try_from([7u8; 64].as_slice()).unwrap();
    let wrong_key = CookieJar::with_session_signed_by(&other_key, "anything", admin.clone());

    let mut promoted = CookieJar::for_role("staff");
    promoted
        .cookies
        .insert(USER_KEY.to_string(), encode_cookie_value(&admin.to_string()));

    for jar in [unsigned, wrong_key, promoted] {
        let response = context.get("/user-management", &jar).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        let response = context.get("/api/session", &jar).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn repeated_logins_from_one_peer_are_rate_limited() {
    let context = TestContext::with_rate_limit(Some(LoginRateLimit {
        period_secs: 60,
        burst_size: 1,
    }))
    .await;
    let peer: SocketAddr = "203.0.113.9:40000".parse().unwrap();

    let login = || {
        let mut request = Request::post("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "email": "admin@home.org", "password": "correct-horse" }).to_string(),
            ))
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));
        request
    };

    let response = context.send(login()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = context.send(login()).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn login_stores_session_and_logout_clears_it() {
    let context = TestContext::new().await;
    let mut jar = CookieJar::default();

    let response = context
        .post_json(
            "/api/auth/login",
            &jar,
            json!({ "email": "admin@home.org", "password": "correct-horse" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    jar.absorb(&response);
    assert!(jar.cookies.contains_key(TOKEN_KEY));
    assert!(jar.cookies.contains_key(USER_KEY));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Welcome back, The admin!");
    assert_eq!(body["redirect"], "/");
    assert_eq!(body["user"]["role"], "admin");

    let response = context.get("/settings", &jar).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = context.post_empty("/api/auth/logout", &jar).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    jar.absorb(&response);
    assert!(jar.cookies.is_empty());

    let response = context.get("/", &jar).await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn login_lands_each_role_on_its_home_page() {
    let context = TestContext::new().await;

    for (email, landing) in [
        ("staff@home.org", "/staff-compliance"),
        ("inspector@home.org", "/reports"),
    ] {
        let response = context
            .post_json(
                "/api/auth/login",
                &CookieJar::default(),
                json!({ "email": email, "password": "correct-horse" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let mut jar = CookieJar::default();
        jar.absorb(&response);

        let body = body_json(response).await;
        assert_eq!(body["redirect"], landing);

        let page = context.get(landing, &jar).await;
        assert_eq!(page.status(), StatusCode::OK, "landing {}", landing);
    }
}

#[tokio::test]
async fn rejected_login_sets_no_cookies() {
    let context = TestContext::new().await;

    let response = context
        .post_json(
            "/api/auth/login",
            &CookieJar::default(),
            json!({ "email": "admin@home.org", "password": "wrong" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let body = body_json(response).await;
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn login_validates_payload_and_surfaces_backend_failures() {
    let context = TestContext::new().await;

    let response = context
        .post_json(
            "/api/auth/login",
            &CookieJar::default(),
            json!({ "email": "not-an-email", "password": "x" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = context
        .post_json(
            "/api/auth/login",
            &CookieJar::default(),
            json!({ "email": "broken@home.org", "password": "x" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn logout_without_session_still_redirects() {
    let context = TestContext::new().await;

    let response = context.post_empty("/api/auth/logout", &CookieJar::default()).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn navigation_lists_links_for_the_role() {
    let context = TestContext::new().await;

    let response = context
        .get("/api/navigation?path=/reports", &CookieJar::for_role("readonly"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let main: Vec<&str> = body["main"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["url"].as_str().unwrap())
        .collect();
    assert_eq!(
        main,
        vec!["/", "/audit-checklist", "/reports", "/staff-compliance", "/policies", "/alerts"]
    );
    assert_eq!(body["administration"].as_array().unwrap().len(), 0);
    assert_eq!(body["main"][2]["active"], true);
    assert_eq!(body["logout_url"], "/api/auth/logout");

    let response = context.get("/api/navigation", &CookieJar::default()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_endpoint_reports_permitted_capabilities() {
    let context = TestContext::new().await;

    let response = context.get("/api/session", &CookieJar::for_role("staff")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user"]["role"], "staff");

    let capabilities: Vec<&str> = body["capabilities"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_str().unwrap())
        .collect();
    assert!(capabilities.contains(&"audit-checklist"));
    assert!(!capabilities.contains(&"settings"));
    assert!(!capabilities.contains(&"reports"));

    let response = context.get("/api/session", &CookieJar::default()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_refresh_replaces_the_stored_profile() {
    let context = TestContext::new().await;
    let mut jar = CookieJar::for_role("admin");

    let response = context.post_empty("/api/auth/refresh", &jar).await;
    assert_eq!(response.status(), StatusCode::OK);
    jar.absorb(&response);

    let body = body_json(response).await;
    assert_eq!(body["user"]["name"], "Renamed id-admin");
    assert_eq!(body["user"]["id"], "id-admin");

    let response = context.get("/api/session", &jar).await;
    let body = body_json(response).await;
    assert_eq!(body["user"]["name"], "Renamed id-admin");
}

#[tokio::test]
async fn rejected_token_on_refresh_ends_the_session() {
    let context = TestContext::new().await;
    let mut jar = CookieJar::for_role("staff");

    let response = context.post_empty("/api/auth/refresh", &jar).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    jar.absorb(&response);
    assert!(jar.cookies.is_empty());

    let response = context.get("/", &jar).await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn policy_documents_redirect_to_the_backend() {
    let context = TestContext::new().await;

    let response = context
        .get("/documents/policies/Fire%20Safety.pdf", &CookieJar::for_role("staff"))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let expected = format!(
        "{}documents/policies/Fire%20Safety.pdf",
        context.backend_url.as_str()
    );
    assert_eq!(location(&response), expected);

    let response = context
        .get("/documents/policies/Fire%20Safety.pdf", &CookieJar::default())
        .await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn unknown_routes_render_not_found() {
    let context = TestContext::new().await;

    let response = context.get("/does-not-exist", &CookieJar::default()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("Page not found"));
    assert!(!html.contains("<aside"));

    let response = context.get("/does-not-exist", &CookieJar::for_role("admin")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("<aside"));
}

#[tokio::test]
async fn login_page_is_public() {
    let context = TestContext::new().await;

    let response = context.get("/login", &CookieJar::default()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Access your OFSTED account"));
    assert!(html.contains("/api/auth/login"));
}
