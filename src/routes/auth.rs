use axum::extract::State;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::post;
use axum::{Form, Router};
use serde::Deserialize;

use crate::controller::LoginOutcome;
use crate::domain::{Credentials, Role};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentBrowser;
use crate::navigation::Page;
use crate::routes::pages::{Html, LoginTemplate};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub role: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Attach the browser id cookie if this browser did not have one yet.
pub(crate) fn with_browser_cookie(
    mut response: Response,
    current: &CurrentBrowser,
    state: &AppState,
) -> AppResult<Response> {
    if let Some(cookie) = current.cookie(state) {
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::Internal(format!("Invalid cookie header: {}", e)))?;
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    Ok(response)
}

/// POST /login — role-checked login, then navigate to the role's home
pub async fn login(
    State(state): State<AppState>,
    current: CurrentBrowser,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let role: Role = match form.role.parse() {
        Ok(role) => role,
        Err(_) => return Ok(Redirect::to(&Page::Index.path()).into_response()),
    };

    let credentials = Credentials {
        username: form.username,
        password: form.password,
    };

    match state
        .controller
        .login(&current.browser, &credentials, role)
        .await?
    {
        LoginOutcome::Navigate(page) => {
            with_browser_cookie(Redirect::to(&page.path()).into_response(), &current, &state)
        }
        LoginOutcome::Rejected { notice } => {
            Ok(Html(LoginTemplate::new(role, Some(notice))).into_response())
        }
    }
}

/// POST /logout — clear token and role, back to the login entry
pub async fn logout(
    State(state): State<AppState>,
    current: CurrentBrowser,
) -> AppResult<Response> {
    let page = state.controller.logout(&current.browser)?;
    Ok(Redirect::to(&page.path()).into_response())
}
