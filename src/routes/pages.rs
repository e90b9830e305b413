use askama::Template;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::controller::PageLoad;
use crate::domain::Role;
use crate::error::AppResult;
use crate::extractors::CurrentBrowser;
use crate::navigation::Page;
use crate::state::AppState;

#[derive(Template)]
#[template(path = "pages/index.html")]
pub struct IndexTemplate {
    pub user_login: String,
    pub admin_login: String,
}

#[derive(Template)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub role: Role,
    pub heading: String,
    pub notice: Option<String>,
}

impl LoginTemplate {
    pub fn new(role: Role, notice: Option<String>) -> Self {
        let heading = match role {
            Role::User => "User login",
            Role::Admin => "Admin login",
        };
        Self {
            role,
            heading: heading.to_string(),
            notice,
        }
    }
}

#[derive(Template)]
#[template(path = "pages/user.html")]
pub struct UserTemplate {
    pub list_html: String,
}

#[derive(Template)]
#[template(path = "pages/admin.html")]
pub struct AdminTemplate {
    pub list_html: String,
}

/// Wrapper to render askama templates as axum responses
pub struct Html<T: Template>(pub T);

impl<T: Template> IntoResponse for Html<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
            }
        }
    }
}

#[derive(Deserialize)]
pub struct LoginQuery {
    role: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page))
        .route("/user", get(user_page))
        .route("/admin", get(admin_page))
}

async fn index() -> impl IntoResponse {
    Html(IndexTemplate {
        user_login: Page::Login(Role::User).path(),
        admin_login: Page::Login(Role::Admin).path(),
    })
}

/// GET /login?role=... — the role picks which account kind may sign in.
async fn login_page(Query(query): Query<LoginQuery>) -> Response {
    match query.role.as_deref().map(str::parse::<Role>) {
        Some(Ok(role)) => Html(LoginTemplate::new(role, None)).into_response(),
        _ => Redirect::to(&Page::Index.path()).into_response(),
    }
}

async fn user_page(
    State(state): State<AppState>,
    current: CurrentBrowser,
) -> AppResult<Response> {
    let list_html = match state.controller.load(&current.browser, Page::UserHome).await? {
        PageLoad::Redirect(to) => return Ok(Redirect::to(&to.path()).into_response()),
        PageLoad::Render { view } => match view {
            Some(view) => view.to_html()?,
            None => String::new(),
        },
    };

    Ok(Html(UserTemplate { list_html }).into_response())
}

async fn admin_page(
    State(state): State<AppState>,
    current: CurrentBrowser,
) -> AppResult<Response> {
    let list_html = match state.controller.load(&current.browser, Page::AdminHome).await? {
        PageLoad::Redirect(to) => return Ok(Redirect::to(&to.path()).into_response()),
        PageLoad::Render { view } => match view {
            Some(view) => view.to_html()?,
            None => String::new(),
        },
    };

    Ok(Html(AdminTemplate { list_html }).into_response())
}
