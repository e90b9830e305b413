//! Client side of the complaint REST API.

pub mod client;
pub mod fake;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{
    BearerToken, Complaint, ComplaintId, ComplaintStatus, Credentials, NewComplaint, Role, Session,
};

pub use client::HttpComplaintApi;
pub use fake::FakeComplaintApi;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access denied: expected role {expected}, got {actual}")]
    AccessDenied { expected: Role, actual: Role },

    #[error("Unknown role in login response: {0}")]
    UnknownRole(String),

    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Body of `POST /api/login`. A failed login carries only `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl LoginResponse {
    /// Turn a login payload into a session, enforcing the expected role.
    pub fn into_session(self, expected: Option<Role>) -> Result<Session, ApiError> {
        let token = match self.token {
            Some(token) if !token.is_empty() => BearerToken::new(token),
            _ => return Err(ApiError::InvalidCredentials),
        };

        let raw_role = self.role.unwrap_or_default();
        let role: Role = raw_role
            .parse()
            .map_err(|_| ApiError::UnknownRole(raw_role.clone()))?;

        if let Some(expected) = expected {
            if expected != role {
                return Err(ApiError::AccessDenied {
                    expected,
                    actual: role,
                });
            }
        }

        Ok(Session { token, role })
    }
}

/// Operations offered by the complaint backend.
///
/// Every call is a single exchange: no retries, no caching.
#[async_trait]
pub trait ComplaintApi: Send + Sync {
    /// Exchange credentials for a session, rejecting a role other than `expected`.
    async fn login(
        &self,
        credentials: &Credentials,
        expected: Option<Role>,
    ) -> Result<Session, ApiError>;

    /// Full complaint collection, in server order.
    async fn list(&self, token: Option<&BearerToken>) -> Result<Vec<Complaint>, ApiError>;

    /// File a complaint. Returns the created record when the server echoes it.
    async fn create(
        &self,
        token: Option<&BearerToken>,
        complaint: &NewComplaint,
    ) -> Result<Option<Complaint>, ApiError>;

    async fn update_status(
        &self,
        token: Option<&BearerToken>,
        id: &ComplaintId,
        status: &ComplaintStatus,
    ) -> Result<(), ApiError>;

    async fn delete(&self, token: Option<&BearerToken>, id: &ComplaintId)
        -> Result<(), ApiError>;

    async fn resolve(&self, token: Option<&BearerToken>, id: &ComplaintId) -> Result<(), ApiError> {
        self.update_status(token, id, &ComplaintStatus::resolved())
            .await
    }
}
