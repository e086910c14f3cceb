use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::sheets::SheetsApi;
use crate::users::NewUser;

use super::{
    models::{CredentialsRequest, ErrorResponse, HealthResponse, SearchQuery, UserResponse},
    AppState,
};

const SESSION_COOKIE: &str = "slabstock_session";

fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

fn authenticated_user_id<S>(state: &AppState<S>, headers: &HeaderMap) -> Option<i64> {
    session_token(headers).and_then(|token| state.sessions.resolve(&token))
}

fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0")
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            message: message.to_string(),
        }),
    )
        .into_response()
}

pub async fn health<S: SheetsApi + 'static>(State(state): State<AppState<S>>) -> impl IntoResponse {
    let uptime_secs = state.started_at.elapsed().map(|d| d.as_secs()).unwrap_or(0);
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            uptime_secs,
        }),
    )
}

pub async fn register<S: SheetsApi + 'static>(
    State(state): State<AppState<S>>,
    Json(req): Json<CredentialsRequest>,
) -> Response {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return bad_request("username and password are required");
    }
    if state.users.get_by_username(&req.username).await.is_some() {
        return bad_request("username already exists");
    }
    let hashed = match state.hasher.hash(&req.password) {
        Ok(hashed) => hashed,
        Err(err) => {
            log::error!("hashing password for {:?}: {err}", req.username);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    match state
        .users
        .create(NewUser {
            username: req.username,
            password: hashed,
        })
        .await
    {
        Ok(user) => {
            let token = state.sessions.open(user.id);
            (
                StatusCode::CREATED,
                [(header::SET_COOKIE, session_cookie(&token))],
                Json(UserResponse {
                    id: user.id,
                    username: user.username,
                }),
            )
                .into_response()
        }
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                message: err.to_string(),
            }),
        )
            .into_response(),
    }
}

pub async fn login<S: SheetsApi + 'static>(
    State(state): State<AppState<S>>,
    Json(req): Json<CredentialsRequest>,
) -> Response {
    let Some(user) = state.users.get_by_username(&req.username).await else {
        return unauthorized("invalid username or password");
    };
    match state.hasher.verify(&req.password, &user.password) {
        Ok(true) => {
            let token = state.sessions.open(user.id);
            (
                StatusCode::OK,
                [(header::SET_COOKIE, session_cookie(&token))],
                Json(UserResponse {
                    id: user.id,
                    username: user.username,
                }),
            )
                .into_response()
        }
        Ok(false) => unauthorized("invalid username or password"),
        Err(err) => {
            log::warn!("verifying credentials for {:?}: {err}", req.username);
            unauthorized("invalid username or password")
        }
    }
}

pub async fn logout<S: SheetsApi + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        state.sessions.revoke(&token);
    }
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
    )
}

pub async fn me<S: SheetsApi + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Response {
    let Some(user_id) = authenticated_user_id(&state, &headers) else {
        return unauthorized("login required");
    };
    match state.users.get_by_id(user_id).await {
        Some(user) => Json(UserResponse {
            id: user.id,
            username: user.username,
        })
        .into_response(),
        None => unauthorized("session expired"),
    }
}

pub async fn search<S: SheetsApi + 'static>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Response {
    if authenticated_user_id(&state, &headers).is_none() {
        return unauthorized("login required");
    }
    // The record source compares inputs verbatim; normalize here.
    let block_no = query.block_no.as_deref().map(str::trim).unwrap_or("");
    if block_no.is_empty() {
        return bad_request("blockNo is required");
    }
    let part_no = query
        .part_no
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let thickness = query
        .thickness
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match state.records.search(block_no, part_no, thickness).await {
        Ok(records) => Json(records).into_response(),
        Err(err) => {
            log::error!("search for blockNo {block_no:?} failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    message: "search failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            message: "endpoint not found".to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{PasswordHasher, SessionStore};
    use crate::records::{RecordLayout, RecordSource};
    use crate::rest::router;
    use crate::sheets::fake::FakeSheets;
    use crate::users::UserRepository;

    /// Work-factor-free hasher so router tests stay fast; the argon2
    /// implementation has its own tests.
    struct PlainHasher;

    impl PasswordHasher for PlainHasher {
        fn hash(&self, password: &str) -> anyhow::Result<String> {
            Ok(format!("plain:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> anyhow::Result<bool> {
            Ok(hash == format!("plain:{password}"))
        }
    }

    fn state_for(fake: &Arc<FakeSheets>) -> AppState<FakeSheets> {
        AppState {
            records: Arc::new(RecordSource::new(fake.clone(), RecordLayout::standard())),
            users: Arc::new(UserRepository::new(fake.clone())),
            sessions: SessionStore::new(Duration::from_secs(3600)),
            hasher: Arc::new(PlainHasher),
            started_at: SystemTime::now(),
        }
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_cookie(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri).method("GET");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn send(state: &AppState<FakeSheets>, req: Request<Body>) -> Response {
        router(state.clone()).oneshot(req).await.unwrap()
    }

    fn cookie_of(response: &Response) -> String {
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("set-cookie header")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn register_login_search_flow() {
        let fake = Arc::new(FakeSheets::new().with_sheet(
            "Data",
            vec![vec!["B1", "P1", "10", "5", "red", "blue"]],
        ));
        let state = state_for(&fake);

        // Search without a session is rejected.
        let response = send(&state, get_with_cookie("/api/search?blockNo=b1", None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        // Register opens a session.
        let response = send(
            &state,
            post_json("/api/register", json!({"username": "alice", "password": "pw"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = cookie_of(&response);
        let body = body_json(response).await;
        assert_eq!(body, json!({"id": 1, "username": "alice"}));

        // The stored credential is the hash, never the plaintext.
        assert_eq!(fake.rows("User")[0][2], "plain:pw");

        // Search with the session cookie hits the data sheet.
        let response = send(
            &state,
            get_with_cookie("/api/search?blockNo=b1", Some(&cookie)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(
            body,
            json!([{
                "blockNo": "B1",
                "partNo": "P1",
                "thickness": "10",
                "nos": "5",
                "color1": "red",
                "color2": "blue",
            }])
        );

        // A fresh login works with the registered password.
        let response = send(
            &state,
            post_json("/api/login", json!({"username": "ALICE", "password": "pw"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &state,
            post_json("/api/login", json!({"username": "alice", "password": "nope"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let fake = Arc::new(FakeSheets::new());
        let state = state_for(&fake);

        let body = json!({"username": "alice", "password": "pw"});
        let first = send(&state, post_json("/api/register", body.clone())).await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = send(&state, post_json("/api/register", body)).await;
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        let body = body_json(second).await;
        assert_eq!(body["message"], "username already exists");
        assert_eq!(fake.rows("User").len(), 1);
    }

    #[tokio::test]
    async fn register_requires_credentials() {
        let state = state_for(&Arc::new(FakeSheets::new()));
        let response = send(
            &state,
            post_json("/api/register", json!({"username": "  ", "password": "pw"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn search_trims_parameters_and_requires_block_no() {
        let fake = Arc::new(FakeSheets::new().with_sheet(
            "Data",
            vec![vec!["B1", "P1", "10", "5", "red", "blue"]],
        ));
        let state = state_for(&fake);
        let token = state.sessions.open(1);
        let cookie = format!("{SESSION_COOKIE}={token}");

        let response = send(
            &state,
            get_with_cookie("/api/search?blockNo=%20b1%20", Some(&cookie)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        // Whitespace-only blockNo is missing.
        let response = send(
            &state,
            get_with_cookie("/api/search?blockNo=%20%20", Some(&cookie)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&state, get_with_cookie("/api/search", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // An empty optional filter does not narrow the result.
        let response = send(
            &state,
            get_with_cookie("/api/search?blockNo=b1&partNo=%20", Some(&cookie)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_maps_backing_failure_to_500() {
        let fake = Arc::new(FakeSheets::new().fail_reads());
        let state = state_for(&fake);
        let token = state.sessions.open(1);
        let cookie = format!("{SESSION_COOKIE}={token}");

        let response = send(
            &state,
            get_with_cookie("/api/search?blockNo=b1", Some(&cookie)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn logout_revokes_the_session() {
        let fake = Arc::new(FakeSheets::new().with_sheet("User", vec![vec!["1", "alice", "h"]]));
        let state = state_for(&fake);
        let token = state.sessions.open(1);
        let cookie = format!("{SESSION_COOKIE}={token}");

        let response = send(&state, get_with_cookie("/api/user", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["username"], "alice");

        let logout = Request::builder()
            .uri("/api/logout")
            .method("POST")
            .header(header::COOKIE, &cookie)
            .body(Body::empty())
            .unwrap();
        let response = send(&state, logout).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&state, get_with_cookie("/api/user", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_endpoint_is_a_json_404() {
        let state = state_for(&Arc::new(FakeSheets::new()));
        let response = send(&state, get_with_cookie("/api/nope", None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "endpoint not found");
    }
}
