use crate::domain::{BearerToken, Role, Session};
use crate::session::storage::{LocalStorage, StorageError};

pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY: &str = "role";

/// Token + role persisted in a [`LocalStorage`].
#[derive(Clone)]
pub struct SessionStore<S> {
    storage: S,
}

impl<S: LocalStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn set_session(&self, session: &Session) -> Result<(), StorageError> {
        self.storage.set_items(&[
            (TOKEN_KEY, session.token.as_str()),
            (ROLE_KEY, session.role.as_str()),
        ])
    }

    pub fn token(&self) -> Result<Option<BearerToken>, StorageError> {
        Ok(self
            .storage
            .get_item(TOKEN_KEY)?
            .filter(|t| !t.is_empty())
            .map(BearerToken::new))
    }

    /// Stored role. A value that is not a known role reads as absent.
    pub fn role(&self) -> Result<Option<Role>, StorageError> {
        Ok(self
            .storage
            .get_item(ROLE_KEY)?
            .and_then(|r| r.parse::<Role>().ok()))
    }

    pub fn session(&self) -> Result<Option<Session>, StorageError> {
        match (self.token()?, self.role()?) {
            (Some(token), Some(role)) => Ok(Some(Session { token, role })),
            _ => Ok(None),
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_items(&[TOKEN_KEY, ROLE_KEY])
    }
}
