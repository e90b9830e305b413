//! HttpComplaintApi against a live in-process backend that answers the way
//! the reference complaint server does.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use complaint_desk::api::{ApiError, ComplaintApi, HttpComplaintApi};
use complaint_desk::config::ApiConfig;
use complaint_desk::domain::{
    BearerToken, Complaint, ComplaintId, ComplaintStatus, Credentials, NewComplaint, Role,
};

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    authorization: Option<String>,
    body: Option<Value>,
}

#[derive(Clone, Default)]
struct Backend {
    complaints: Arc<Mutex<Vec<Complaint>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    next_id: Arc<Mutex<u32>>,
}

impl Backend {
    fn record(&self, method: Method, path: String, headers: &HeaderMap, body: Option<Value>) {
        self.requests.lock().unwrap().push(Recorded {
            method,
            path,
            authorization: headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(String::from),
            body,
        });
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn seed(&self, id: &str, title: &str) {
        self.complaints.lock().unwrap().push(Complaint {
            id: ComplaintId::new(id),
            username: Some("user".into()),
            name: "Seed".into(),
            email: "seed@x.com".into(),
            phone: "0".into(),
            category: "Other".into(),
            title: title.into(),
            description: "seeded".into(),
            status: ComplaintStatus::new("Pending"),
        });
    }
}

fn token_user(headers: &HeaderMap) -> Option<&'static str> {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("jwt-admin") | Some("Bearer jwt-admin") => Some("admin"),
        Some("jwt-user") | Some("Bearer jwt-user") => Some("user"),
        _ => None,
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Token missing"}))).into_response()
}

async fn login(State(backend): State<Backend>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    backend.record(Method::POST, "/api/login".into(), &headers, Some(body.clone()));
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (username, password) {
        ("admin", "admin123") => Json(json!({"token": "jwt-admin", "role": "admin"})).into_response(),
        ("user", "user123") => Json(json!({"token": "jwt-user", "role": "user"})).into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials"})),
        )
            .into_response(),
    }
}

async fn list(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record(Method::GET, "/api/complaints".into(), &headers, None);
    if token_user(&headers).is_none() {
        return unauthorized();
    }
    let complaints = backend.complaints.lock().unwrap().clone();
    Json(complaints).into_response()
}

async fn create(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record(Method::POST, "/api/complaints".into(), &headers, Some(body.clone()));
    let Some(owner) = token_user(&headers) else {
        return unauthorized();
    };
    let fields: NewComplaint = serde_json::from_value(body).unwrap();
    let id = {
        let mut next = backend.next_id.lock().unwrap();
        *next += 1;
        format!("CMP{:03}", *next)
    };
    backend.complaints.lock().unwrap().push(Complaint {
        id: ComplaintId::new(id),
        username: Some(owner.into()),
        name: fields.name,
        email: fields.email,
        phone: fields.phone,
        category: fields.category,
        title: fields.title,
        description: fields.description,
        status: ComplaintStatus::new("Pending"),
    });
    (StatusCode::CREATED, Json(json!({"message": "Complaint added"}))).into_response()
}

async fn update(
    State(backend): State<Backend>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    backend.record(
        Method::PUT,
        format!("/api/complaints/{}", id),
        &headers,
        Some(body.clone()),
    );
    match token_user(&headers) {
        None => return unauthorized(),
        Some("admin") => {}
        Some(_) => {
            return (StatusCode::FORBIDDEN, Json(json!({"message": "Access denied"})))
                .into_response()
        }
    }
    let status = body["status"].as_str().unwrap_or_default().to_string();
    for complaint in backend.complaints.lock().unwrap().iter_mut() {
        if complaint.id.as_str() == id {
            complaint.status = ComplaintStatus::new(status.clone());
        }
    }
    Json(json!({"message": "Status updated"})).into_response()
}

async fn remove(
    State(backend): State<Backend>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    backend.record(Method::DELETE, format!("/api/complaints/{}", id), &headers, None);
    if token_user(&headers) != Some("admin") {
        return (StatusCode::FORBIDDEN, Json(json!({"message": "Access denied"}))).into_response();
    }
    backend
        .complaints
        .lock()
        .unwrap()
        .retain(|c| c.id.as_str() != id);
    Json(json!({"message": "Deleted"})).into_response()
}

async fn spawn_backend() -> (SocketAddr, Backend) {
    let backend = Backend::default();
    let app = Router::new()
        .route("/api/login", post(login))
        .route("/api/complaints", post(create).get(list))
        .route("/api/complaints/{id}", put(update).delete(remove))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, backend)
}

fn client_for(addr: SocketAddr, auth_scheme: Option<&str>) -> HttpComplaintApi {
    HttpComplaintApi::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        auth_scheme: auth_scheme.map(String::from),
        timeout_secs: Some(5),
    })
    .unwrap()
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.into(),
        password: password.into(),
    }
}

fn admin_token() -> BearerToken {
    BearerToken::new("jwt-admin")
}

#[tokio::test]
async fn login_returns_session_for_requested_role() {
    let (addr, backend) = spawn_backend().await;
    let api = client_for(addr, None);

    let session = api
        .login(&credentials("admin", "admin123"), Some(Role::Admin))
        .await
        .unwrap();
    assert_eq!(session.token.as_str(), "jwt-admin");
    assert_eq!(session.role, Role::Admin);

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization, None);
    assert_eq!(
        requests[0].body,
        Some(json!({"username": "admin", "password": "admin123"}))
    );
}

#[tokio::test]
async fn rejected_login_is_invalid_credentials() {
    let (addr, _backend) = spawn_backend().await;
    let api = client_for(addr, None);

    let err = api
        .login(&credentials("admin", "nope"), Some(Role::Admin))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials), "got {:?}", err);
}

#[tokio::test]
async fn login_for_other_role_is_access_denied() {
    let (addr, _backend) = spawn_backend().await;
    let api = client_for(addr, None);

    let err = api
        .login(&credentials("user", "user123"), Some(Role::Admin))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::AccessDenied {
            expected: Role::Admin,
            actual: Role::User
        }
    ));
}

#[tokio::test]
async fn list_sends_token_verbatim() {
    let (addr, backend) = spawn_backend().await;
    backend.seed("CMP001", "Seeded");
    let api = client_for(addr, None);

    let complaints = api.list(Some(&admin_token())).await.unwrap();
    assert_eq!(complaints.len(), 1);
    assert_eq!(complaints[0].title, "Seeded");
    assert_eq!(
        backend.requests()[0].authorization.as_deref(),
        Some("jwt-admin")
    );
}

#[tokio::test]
async fn auth_scheme_prefixes_token() {
    let (addr, backend) = spawn_backend().await;
    let api = client_for(addr, Some("Bearer"));

    api.list(Some(&admin_token())).await.unwrap();
    assert_eq!(
        backend.requests()[0].authorization.as_deref(),
        Some("Bearer jwt-admin")
    );
}

#[tokio::test]
async fn list_without_token_reports_status() {
    let (addr, backend) = spawn_backend().await;
    let api = client_for(addr, None);

    let err = api.list(None).await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Token missing");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(backend.requests()[0].authorization, None);
}

#[tokio::test]
async fn created_complaint_appears_in_next_list() {
    let (addr, backend) = spawn_backend().await;
    let api = client_for(addr, None);
    let token = BearerToken::new("jwt-user");

    let fields = NewComplaint {
        name: "A".into(),
        email: "a@x.com".into(),
        phone: "1".into(),
        category: "Billing".into(),
        title: "T".into(),
        description: "D".into(),
    };
    // The reference backend only acknowledges; nothing to echo back.
    let created = api.create(Some(&token), &fields).await.unwrap();
    assert!(created.is_none());

    let body = backend.requests()[0].body.clone().unwrap();
    assert_eq!(
        body,
        json!({
            "name": "A",
            "email": "a@x.com",
            "phone": "1",
            "category": "Billing",
            "title": "T",
            "description": "D"
        })
    );

    let complaints = api.list(Some(&token)).await.unwrap();
    assert_eq!(complaints.len(), 1);
    let record = &complaints[0];
    assert_eq!(record.id.as_str(), "CMP001");
    assert_eq!(record.status.as_str(), "Pending");
    assert_eq!(record.name, "A");
    assert_eq!(record.email, "a@x.com");
    assert_eq!(record.phone, "1");
    assert_eq!(record.category, "Billing");
    assert_eq!(record.title, "T");
    assert_eq!(record.description, "D");
}

#[tokio::test]
async fn resolve_puts_resolved_status_once() {
    let (addr, backend) = spawn_backend().await;
    backend.seed("7", "Seven");
    let api = client_for(addr, None);

    api.resolve(Some(&admin_token()), &ComplaintId::new("7"))
        .await
        .unwrap();

    let puts: Vec<Recorded> = backend
        .requests()
        .into_iter()
        .filter(|r| r.method == Method::PUT)
        .collect();
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].path, "/api/complaints/7");
    assert_eq!(puts[0].body, Some(json!({"status": "Resolved"})));

    let complaints = api.list(Some(&admin_token())).await.unwrap();
    assert_eq!(complaints[0].status.as_str(), "Resolved");
}

#[tokio::test]
async fn delete_removes_complaint() {
    let (addr, backend) = spawn_backend().await;
    backend.seed("7", "Seven");
    backend.seed("8", "Eight");
    let api = client_for(addr, None);

    api.delete(Some(&admin_token()), &ComplaintId::new("7"))
        .await
        .unwrap();

    let deletes: Vec<Recorded> = backend
        .requests()
        .into_iter()
        .filter(|r| r.method == Method::DELETE)
        .collect();
    assert_eq!(deletes.len(), 1);
    assert_eq!(deletes[0].path, "/api/complaints/7");

    let remaining = api.list(Some(&admin_token())).await.unwrap();
    assert!(remaining.iter().all(|c| c.id.as_str() != "7"));
    assert_eq!(remaining.len(), 1);
}

#[tokio::test]
async fn forbidden_update_reports_status() {
    let (addr, backend) = spawn_backend().await;
    backend.seed("7", "Seven");
    let api = client_for(addr, None);

    let err = api
        .resolve(Some(&BearerToken::new("jwt-user")), &ComplaintId::new("7"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 403, .. }));
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Grab a free port, then close it again.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = client_for(addr, None);
    let err = api.list(Some(&admin_token())).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "got {:?}", err);
}
