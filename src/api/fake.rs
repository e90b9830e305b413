//! In-memory complaint backend for tests and local demos.
//!
//! Mirrors the reference server: two demo accounts, `CMP###` ids, new
//! complaints start as `Pending`, users only see their own complaints and only
//! admins may change or delete them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::api::{ApiError, ComplaintApi, LoginResponse};
use crate::domain::{
    BearerToken, Complaint, ComplaintId, ComplaintStatus, Credentials, NewComplaint, Role, Session,
};

/// One observed call, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Login { username: String },
    List,
    Create { title: String },
    UpdateStatus { id: String, status: String },
    Delete { id: String },
}

struct Account {
    password: String,
    role: Role,
}

#[derive(Default)]
struct Backend {
    accounts: HashMap<String, Account>,
    /// token -> username
    tokens: HashMap<String, String>,
    complaints: Vec<Complaint>,
    next_id: u32,
    calls: Vec<ApiCall>,
}

pub struct FakeComplaintApi {
    backend: Mutex<Backend>,
    offline: AtomicBool,
}

impl Default for FakeComplaintApi {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeComplaintApi {
    /// Backend with the demo accounts `admin/admin123` and `user/user123`.
    pub fn new() -> Self {
        let api = Self {
            backend: Mutex::new(Backend {
                next_id: 1,
                ..Backend::default()
            }),
            offline: AtomicBool::new(false),
        };
        api.add_account("admin", "admin123", Role::Admin);
        api.add_account("user", "user123", Role::User);
        api
    }

    pub fn add_account(&self, username: &str, password: &str, role: Role) {
        let mut backend = self.lock();
        backend.accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                role,
            },
        );
        backend
            .tokens
            .insert(format!("token-{}", username), username.to_string());
    }

    /// Token the fake issues for `username`.
    pub fn token_for(username: &str) -> BearerToken {
        BearerToken::new(format!("token-{}", username))
    }

    /// Insert a complaint directly, bypassing the call log.
    pub fn seed(&self, owner: &str, fields: NewComplaint) -> ComplaintId {
        let mut backend = self.lock();
        insert(&mut backend, owner, fields).id
    }

    /// Simulate an unreachable backend.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn complaints(&self) -> Vec<Complaint> {
        self.lock().complaints.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Backend> {
        // A panicking test thread must not hide the backend from the others.
        self.backend.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_online(&self) -> Result<(), ApiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

fn insert(backend: &mut Backend, owner: &str, fields: NewComplaint) -> Complaint {
    let complaint = Complaint {
        id: ComplaintId::new(format!("CMP{:03}", backend.next_id)),
        username: Some(owner.to_string()),
        name: fields.name,
        email: fields.email,
        phone: fields.phone,
        category: fields.category,
        title: fields.title,
        description: fields.description,
        status: ComplaintStatus::new("Pending"),
    };
    backend.next_id += 1;
    backend.complaints.push(complaint.clone());
    complaint
}

fn status(code: u16, message: &str) -> ApiError {
    ApiError::Status {
        status: code,
        message: message.to_string(),
    }
}

/// Resolve a token to `(username, role)`, as the server's auth guard does.
fn authenticate(backend: &Backend, token: Option<&BearerToken>) -> Result<(String, Role), ApiError> {
    let token = token.ok_or_else(|| status(401, "Token missing"))?;
    let username = backend
        .tokens
        .get(token.as_str())
        .ok_or_else(|| status(401, "Invalid token"))?;
    let account = backend
        .accounts
        .get(username)
        .ok_or_else(|| status(401, "Invalid token"))?;
    Ok((username.clone(), account.role))
}

fn require_admin(backend: &Backend, token: Option<&BearerToken>) -> Result<(), ApiError> {
    match authenticate(backend, token)? {
        (_, Role::Admin) => Ok(()),
        _ => Err(status(403, "Access denied")),
    }
}

#[async_trait]
impl ComplaintApi for FakeComplaintApi {
    async fn login(
        &self,
        credentials: &Credentials,
        expected: Option<Role>,
    ) -> Result<Session, ApiError> {
        self.ensure_online()?;
        let mut backend = self.lock();
        backend.calls.push(ApiCall::Login {
            username: credentials.username.clone(),
        });

        let response = match backend.accounts.get(&credentials.username) {
            Some(account) if account.password == credentials.password => LoginResponse {
                token: Some(Self::token_for(&credentials.username).0),
                role: Some(account.role.to_string()),
                message: None,
            },
            _ => LoginResponse {
                message: Some("Invalid credentials".into()),
                ..LoginResponse::default()
            },
        };
        response.into_session(expected)
    }

    async fn list(&self, token: Option<&BearerToken>) -> Result<Vec<Complaint>, ApiError> {
        self.ensure_online()?;
        let mut backend = self.lock();
        backend.calls.push(ApiCall::List);

        let (username, role) = authenticate(&backend, token)?;
        Ok(backend
            .complaints
            .iter()
            .filter(|c| role == Role::Admin || c.username.as_deref() == Some(username.as_str()))
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        token: Option<&BearerToken>,
        complaint: &NewComplaint,
    ) -> Result<Option<Complaint>, ApiError> {
        self.ensure_online()?;
        let mut backend = self.lock();
        backend.calls.push(ApiCall::Create {
            title: complaint.title.clone(),
        });

        let (username, _) = authenticate(&backend, token)?;
        Ok(Some(insert(&mut backend, &username, complaint.clone())))
    }

    async fn update_status(
        &self,
        token: Option<&BearerToken>,
        id: &ComplaintId,
        new_status: &ComplaintStatus,
    ) -> Result<(), ApiError> {
        self.ensure_online()?;
        let mut backend = self.lock();
        backend.calls.push(ApiCall::UpdateStatus {
            id: id.to_string(),
            status: new_status.to_string(),
        });

        require_admin(&backend, token)?;
        if let Some(complaint) = backend.complaints.iter_mut().find(|c| &c.id == id) {
            complaint.status = new_status.clone();
        }
        Ok(())
    }

    async fn delete(
        &self,
        token: Option<&BearerToken>,
        id: &ComplaintId,
    ) -> Result<(), ApiError> {
        self.ensure_online()?;
        let mut backend = self.lock();
        backend.calls.push(ApiCall::Delete { id: id.to_string() });

        require_admin(&backend, token)?;
        backend.complaints.retain(|c| &c.id != id);
        Ok(())
    }
}
