// Page state machine - which page a browser may see, and where it goes next
use crate::domain::{Role, Session};
use crate::view::Container;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Role chooser; the entry point for unauthenticated browsers.
    Index,
    Login(Role),
    UserHome,
    AdminHome,
}

impl Page {
    pub fn home(role: Role) -> Self {
        match role {
            Role::User => Page::UserHome,
            Role::Admin => Page::AdminHome,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Page::Index => "/".to_string(),
            Page::Login(role) => format!("/login?role={}", role),
            Page::UserHome => "/user".to_string(),
            Page::AdminHome => "/admin".to_string(),
        }
    }

    /// Role a browser must hold to view the page, if any.
    pub fn required_role(&self) -> Option<Role> {
        match self {
            Page::Index | Page::Login(_) => None,
            Page::UserHome => Some(Role::User),
            Page::AdminHome => Some(Role::Admin),
        }
    }

    pub fn container(&self) -> Option<Container> {
        match self {
            Page::UserHome => Some(Container::UserList),
            Page::AdminHome => Some(Container::AdminTable),
            Page::Index | Page::Login(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated(Role),
}

impl AuthState {
    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(session) => AuthState::Authenticated(session.role),
            None => AuthState::Unauthenticated,
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            AuthState::Authenticated(role) => Some(*role),
            AuthState::Unauthenticated => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    Redirect(Page),
}

/// Admit the browser to `page` or send it back to the login entry.
pub fn guard(state: AuthState, page: Page) -> Navigation {
    match (page.required_role(), state) {
        (None, _) => Navigation::Stay,
        (Some(required), AuthState::Authenticated(role)) if role == required => Navigation::Stay,
        (Some(_), _) => Navigation::Redirect(Page::Index),
    }
}

pub fn after_login(role: Role) -> (AuthState, Page) {
    (AuthState::Authenticated(role), Page::home(role))
}

pub fn after_logout() -> (AuthState, Page) {
    (AuthState::Unauthenticated, Page::Index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BearerToken;

    #[test]
    fn open_pages_admit_everyone() {
        for state in [
            AuthState::Unauthenticated,
            AuthState::Authenticated(Role::User),
            AuthState::Authenticated(Role::Admin),
        ] {
            assert_eq!(guard(state, Page::Index), Navigation::Stay);
            assert_eq!(guard(state, Page::Login(Role::Admin)), Navigation::Stay);
        }
    }

    #[test]
    fn role_pages_require_matching_role() {
        assert_eq!(
            guard(AuthState::Authenticated(Role::Admin), Page::AdminHome),
            Navigation::Stay
        );
        assert_eq!(
            guard(AuthState::Authenticated(Role::User), Page::UserHome),
            Navigation::Stay
        );
        assert_eq!(
            guard(AuthState::Authenticated(Role::User), Page::AdminHome),
            Navigation::Redirect(Page::Index)
        );
        assert_eq!(
            guard(AuthState::Authenticated(Role::Admin), Page::UserHome),
            Navigation::Redirect(Page::Index)
        );
        assert_eq!(
            guard(AuthState::Unauthenticated, Page::UserHome),
            Navigation::Redirect(Page::Index)
        );
    }

    #[test]
    fn login_and_logout_transitions() {
        assert_eq!(
            after_login(Role::Admin),
            (AuthState::Authenticated(Role::Admin), Page::AdminHome)
        );
        assert_eq!(
            after_login(Role::User),
            (AuthState::Authenticated(Role::User), Page::UserHome)
        );
        assert_eq!(after_logout(), (AuthState::Unauthenticated, Page::Index));
    }

    #[test]
    fn state_follows_session() {
        let session = Session {
            token: BearerToken::new("t"),
            role: Role::Admin,
        };
        assert_eq!(
            AuthState::from_session(Some(&session)),
            AuthState::Authenticated(Role::Admin)
        );
        assert_eq!(AuthState::from_session(None), AuthState::Unauthenticated);
        assert_eq!(AuthState::from_session(None).role(), None);
    }

    #[test]
    fn page_paths() {
        assert_eq!(Page::Index.path(), "/");
        assert_eq!(Page::Login(Role::Admin).path(), "/login?role=admin");
        assert_eq!(Page::home(Role::User).path(), "/user");
        assert_eq!(Page::home(Role::Admin).path(), "/admin");
        assert_eq!(Page::AdminHome.container(), Some(Container::AdminTable));
        assert_eq!(Page::Index.container(), None);
    }
}
