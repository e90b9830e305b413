use axum::extract::{Path, State};
use axum::http::{header, HeaderName, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};

use crate::controller::{ActionOutcome, Refresh};
use crate::domain::{ComplaintId, NewComplaint};
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentBrowser;
use crate::navigation::Page;
use crate::state::AppState;
use crate::view::Container;

/// Tells the page script whether the backend accepted the action.
pub const ACTION_ACCEPTED: HeaderName = HeaderName::from_static("x-action-accepted");

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/complaints", post(create))
        .route("/complaints/view", get(view))
        .route("/complaints/{id}/resolve", post(resolve))
        .route("/complaints/{id}/delete", post(delete))
}

/// Fragment for a refresh: the new container markup, or 204 to keep the
/// current content (superseded or failed fetch).
fn refresh_response(refresh: Refresh) -> AppResult<Response> {
    match refresh {
        Refresh::Rendered(view) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            view.to_html()?,
        )
            .into_response()),
        Refresh::Superseded | Refresh::Failed => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

fn action_response(outcome: ActionOutcome) -> AppResult<Response> {
    match outcome {
        ActionOutcome::Unauthorized => Err(AppError::Unauthorized),
        ActionOutcome::Unreachable => Ok(StatusCode::NO_CONTENT.into_response()),
        ActionOutcome::Completed { accepted, refresh } => {
            let mut response = refresh_response(refresh)?;
            let flag = if accepted { "true" } else { "false" };
            response
                .headers_mut()
                .insert(ACTION_ACCEPTED, header::HeaderValue::from_static(flag));
            Ok(response)
        }
    }
}

/// GET /complaints/view — re-fetch the list for the browser's role
async fn view(State(state): State<AppState>, current: CurrentBrowser) -> AppResult<Response> {
    let session = current
        .browser
        .session
        .session()?
        .ok_or(AppError::Unauthorized)?;
    let container = Page::home(session.role)
        .container()
        .unwrap_or(Container::UserList);

    let refresh = state
        .controller
        .refresh(&current.browser, container)
        .await?;
    refresh_response(refresh)
}

/// POST /complaints — file a complaint, then refresh
async fn create(
    State(state): State<AppState>,
    current: CurrentBrowser,
    Form(complaint): Form<NewComplaint>,
) -> AppResult<Response> {
    let outcome = state
        .controller
        .submit(&current.browser, &complaint)
        .await?;
    action_response(outcome)
}

/// POST /complaints/{id}/resolve
async fn resolve(
    State(state): State<AppState>,
    current: CurrentBrowser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state
        .controller
        .resolve(&current.browser, &ComplaintId::new(id))
        .await?;
    action_response(outcome)
}

/// POST /complaints/{id}/delete
async fn delete(
    State(state): State<AppState>,
    current: CurrentBrowser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let outcome = state
        .controller
        .delete(&current.browser, &ComplaintId::new(id))
        .await?;
    action_response(outcome)
}
