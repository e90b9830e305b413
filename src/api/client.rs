use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use crate::api::{ApiError, ComplaintApi, LoginResponse};
use crate::config::ApiConfig;
use crate::domain::{
    BearerToken, Complaint, ComplaintId, ComplaintStatus, Credentials, NewComplaint, Role, Session,
};

#[derive(Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}

/// `reqwest`-backed client for the complaint REST API.
#[derive(Clone)]
pub struct HttpComplaintApi {
    client: Client,
    base: Url,
    auth_scheme: Option<String>,
}

impl HttpComplaintApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", config.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url.clone()));
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base,
            auth_scheme: config.auth_scheme.clone().filter(|s| !s.is_empty()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL extended with percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn complaint_url(&self, id: &ComplaintId) -> Result<Url, ApiError> {
        self.endpoint(&["api", "complaints", id.as_str()])
    }

    fn authorize(&self, request: RequestBuilder, token: Option<&BearerToken>) -> RequestBuilder {
        match token {
            Some(token) => {
                let value = match &self.auth_scheme {
                    Some(scheme) => format!("{} {}", scheme, token.as_str()),
                    None => token.as_str().to_string(),
                };
                request.header(AUTHORIZATION, value)
            }
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }

    /// Map a non-2xx response to [`ApiError::Status`].
    async fn ensure_success(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Pull `message` out of a JSON error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().chars().take(200).collect())
}

#[async_trait]
impl ComplaintApi for HttpComplaintApi {
    async fn login(
        &self,
        credentials: &Credentials,
        expected: Option<Role>,
    ) -> Result<Session, ApiError> {
        let url = self.endpoint(&["api", "login"])?;
        let response = Self::send(self.client.post(url).json(credentials)).await?;

        // Rejections arrive as 401 + {message}; the payload decides the outcome.
        let payload: LoginResponse = Self::decode(response).await?;
        payload.into_session(expected)
    }

    async fn list(&self, token: Option<&BearerToken>) -> Result<Vec<Complaint>, ApiError> {
        let url = self.endpoint(&["api", "complaints"])?;
        let response = Self::send(self.authorize(self.client.get(url), token)).await?;
        let response = Self::ensure_success(response).await?;
        Self::decode(response).await
    }

    async fn create(
        &self,
        token: Option<&BearerToken>,
        complaint: &NewComplaint,
    ) -> Result<Option<Complaint>, ApiError> {
        let url = self.endpoint(&["api", "complaints"])?;
        let request = self.authorize(self.client.post(url).json(complaint), token);
        let response = Self::ensure_success(Self::send(request).await?).await?;

        // Some backends echo the record, others only acknowledge.
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(serde_json::from_slice::<Complaint>(&bytes).ok())
    }

    async fn update_status(
        &self,
        token: Option<&BearerToken>,
        id: &ComplaintId,
        status: &ComplaintStatus,
    ) -> Result<(), ApiError> {
        let url = self.complaint_url(id)?;
        let body = StatusUpdate {
            status: status.as_str(),
        };
        let request = self.authorize(self.client.put(url).json(&body), token);
        Self::ensure_success(Self::send(request).await?).await?;
        Ok(())
    }

    async fn delete(
        &self,
        token: Option<&BearerToken>,
        id: &ComplaintId,
    ) -> Result<(), ApiError> {
        let url = self.complaint_url(id)?;
        let request = self.authorize(self.client.delete(url), token);
        Self::ensure_success(Self::send(request).await?).await?;
        Ok(())
    }
}
