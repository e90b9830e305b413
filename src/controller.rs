//! Page controller: user actions -> API calls -> storage -> re-render.
//!
//! Every action is one API exchange followed by a full list refresh; there
//! is no optimistic update and no retry. API failures are logged and
//! swallowed, only login reports a notice back to the browser.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::{ApiError, ComplaintApi};
use crate::domain::{ComplaintId, Credentials, NewComplaint, Role, Session};
use crate::navigation::{self, AuthState, Navigation, Page};
use crate::session::{LocalStorage, SessionStore, StorageError};
use crate::view::{self, ComplaintView, Container};

/// One browser: its id and the session store scoped to it.
#[derive(Clone)]
pub struct Browser<S> {
    pub id: String,
    pub session: SessionStore<S>,
}

impl<S: LocalStorage> Browser<S> {
    pub fn new(id: impl Into<String>, storage: S) -> Self {
        Self {
            id: id.into(),
            session: SessionStore::new(storage),
        }
    }

    pub fn auth_state(&self) -> Result<AuthState, StorageError> {
        Ok(AuthState::from_session(self.session.session()?.as_ref()))
    }
}

/// Refresh tickets. A list response is applied only if no newer refresh was
/// started for the same browser while it was in flight.
///
/// Tickets come from one process-wide counter, so a ticket is never handed
/// out twice, even after the browser's entry is dropped. Entries live only
/// while a refresh is in flight.
#[derive(Debug, Default)]
pub struct RefreshSequencer {
    next: AtomicU64,
    latest: Mutex<HashMap<String, u64>>,
}

impl RefreshSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, browser_id: &str) -> u64 {
        let ticket = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        latest.insert(browser_id.to_string(), ticket);
        ticket
    }

    pub fn is_current(&self, browser_id: &str, ticket: u64) -> bool {
        let latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        latest.get(browser_id).copied() == Some(ticket)
    }

    /// Settle `ticket`: true if it is still the newest for the browser, in
    /// which case the browser's entry is dropped.
    pub fn finish(&self, browser_id: &str, ticket: u64) -> bool {
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        if latest.get(browser_id).copied() == Some(ticket) {
            latest.remove(browser_id);
            true
        } else {
            false
        }
    }

    pub fn forget(&self, browser_id: &str) {
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        latest.remove(browser_id);
    }

    /// Browsers with a refresh in flight.
    pub fn in_flight(&self) -> usize {
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Navigate(Page),
    Rejected { notice: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLoad {
    Redirect(Page),
    /// `view` is `None` for pages without a list, or when the list fetch failed.
    Render { view: Option<ComplaintView> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    Rendered(ComplaintView),
    /// A newer refresh for the same browser was started; drop this one.
    Superseded,
    /// Fetch failed; the current content stays.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// No session on this browser.
    Unauthorized,
    /// The backend could not be reached; nothing was refreshed.
    Unreachable,
    /// The backend answered. `accepted` is false when it refused the action.
    Completed { accepted: bool, refresh: Refresh },
}

pub struct PageController {
    api: Arc<dyn ComplaintApi>,
    sequencer: RefreshSequencer,
}

impl PageController {
    pub fn new(api: Arc<dyn ComplaintApi>) -> Self {
        Self {
            api,
            sequencer: RefreshSequencer::new(),
        }
    }

    pub fn sequencer(&self) -> &RefreshSequencer {
        &self.sequencer
    }

    /// Log in for `role`. The session is stored only when the backend issues
    /// a token for exactly that role.
    pub async fn login<S: LocalStorage>(
        &self,
        browser: &Browser<S>,
        credentials: &Credentials,
        role: Role,
    ) -> Result<LoginOutcome, StorageError> {
        match self.api.login(credentials, Some(role)).await {
            Ok(session) => {
                browser.session.set_session(&session)?;
                let (_, home) = navigation::after_login(session.role);
                tracing::info!("Login succeeded for {} as {}", credentials.username, role);
                Ok(LoginOutcome::Navigate(home))
            }
            Err(ApiError::InvalidCredentials) => Ok(rejected("Invalid credentials")),
            Err(ApiError::AccessDenied { expected, actual }) => {
                tracing::info!(
                    "Login for {} rejected: wanted {}, backend says {}",
                    credentials.username,
                    expected,
                    actual
                );
                Ok(rejected("Access denied for this role"))
            }
            Err(ApiError::UnknownRole(raw)) => {
                tracing::warn!("Login returned unknown role: {}", raw);
                Ok(rejected("Access denied for this role"))
            }
            Err(e) => {
                tracing::warn!("Login error: {}", e);
                Ok(rejected("Login failed"))
            }
        }
    }

    pub fn guard<S: LocalStorage>(
        &self,
        browser: &Browser<S>,
        page: Page,
    ) -> Result<Navigation, StorageError> {
        Ok(navigation::guard(browser.auth_state()?, page))
    }

    /// Guard the page, then fetch and render its list when a token exists.
    pub async fn load<S: LocalStorage>(
        &self,
        browser: &Browser<S>,
        page: Page,
    ) -> Result<PageLoad, StorageError> {
        if let Navigation::Redirect(to) = self.guard(browser, page)? {
            return Ok(PageLoad::Redirect(to));
        }

        let container = match page.container() {
            Some(container) => container,
            None => return Ok(PageLoad::Render { view: None }),
        };
        let token = match browser.session.token()? {
            Some(token) => token,
            None => return Ok(PageLoad::Render { view: None }),
        };

        match self.api.list(Some(&token)).await {
            Ok(complaints) => Ok(PageLoad::Render {
                view: Some(view::render(&complaints, container)),
            }),
            Err(e) => {
                tracing::warn!("Error loading complaints: {}", e);
                Ok(PageLoad::Render { view: None })
            }
        }
    }

    /// Sequenced list fetch for `container`.
    pub async fn refresh<S: LocalStorage>(
        &self,
        browser: &Browser<S>,
        container: Container,
    ) -> Result<Refresh, StorageError> {
        let ticket = self.sequencer.begin(&browser.id);
        let token = browser.session.token()?;
        let result = self.api.list(token.as_ref()).await;

        if !self.sequencer.finish(&browser.id, ticket) {
            tracing::debug!("Discarding superseded refresh {} for {}", ticket, browser.id);
            return Ok(Refresh::Superseded);
        }

        match result {
            Ok(complaints) => Ok(Refresh::Rendered(view::render(&complaints, container))),
            Err(e) => {
                tracing::warn!("Error loading complaints: {}", e);
                Ok(Refresh::Failed)
            }
        }
    }

    pub async fn submit<S: LocalStorage>(
        &self,
        browser: &Browser<S>,
        complaint: &NewComplaint,
    ) -> Result<ActionOutcome, StorageError> {
        let session = match browser.session.session()? {
            Some(session) => session,
            None => return Ok(ActionOutcome::Unauthorized),
        };
        let result = self.api.create(Some(&session.token), complaint).await;
        if let Ok(Some(created)) = &result {
            tracing::info!("Complaint {} submitted", created.id);
        }
        self.finish(browser, &session, "submitting complaint", result.map(|_| ()))
            .await
    }

    pub async fn resolve<S: LocalStorage>(
        &self,
        browser: &Browser<S>,
        id: &ComplaintId,
    ) -> Result<ActionOutcome, StorageError> {
        let session = match browser.session.session()? {
            Some(session) => session,
            None => return Ok(ActionOutcome::Unauthorized),
        };
        let result = self.api.resolve(Some(&session.token), id).await;
        self.finish(browser, &session, "resolving complaint", result)
            .await
    }

    pub async fn delete<S: LocalStorage>(
        &self,
        browser: &Browser<S>,
        id: &ComplaintId,
    ) -> Result<ActionOutcome, StorageError> {
        let session = match browser.session.session()? {
            Some(session) => session,
            None => return Ok(ActionOutcome::Unauthorized),
        };
        let result = self.api.delete(Some(&session.token), id).await;
        self.finish(browser, &session, "deleting complaint", result)
            .await
    }

    pub fn logout<S: LocalStorage>(&self, browser: &Browser<S>) -> Result<Page, StorageError> {
        browser.session.clear()?;
        self.sequencer.forget(&browser.id);
        let (_, page) = navigation::after_logout();
        Ok(page)
    }

    /// Shared tail of every action: log failures, then refresh unless the
    /// backend was unreachable.
    async fn finish<S: LocalStorage>(
        &self,
        browser: &Browser<S>,
        session: &Session,
        action: &str,
        result: Result<(), ApiError>,
    ) -> Result<ActionOutcome, StorageError> {
        let accepted = match result {
            Ok(()) => true,
            Err(ApiError::Transport(e)) => {
                tracing::warn!("Error {}: {}", action, e);
                return Ok(ActionOutcome::Unreachable);
            }
            Err(e) => {
                tracing::warn!("Error {}: {}", action, e);
                false
            }
        };

        let container = Page::home(session.role)
            .container()
            .unwrap_or(Container::UserList);
        let refresh = self.refresh(browser, container).await?;
        Ok(ActionOutcome::Completed { accepted, refresh })
    }
}

fn rejected(notice: &str) -> LoginOutcome {
    LoginOutcome::Rejected {
        notice: notice.to_string(),
    }
}
