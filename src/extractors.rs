use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use rand::Rng;

use crate::controller::Browser;
use crate::error::AppError;
use crate::session::SqliteStorage;
use crate::state::AppState;

/// The requesting browser, with its storage rows loaded lazily from SQLite.
///
/// Browsers without a (valid) id cookie get a fresh id; `is_new` tells the
/// handler to send the cookie back if it writes anything.
pub struct CurrentBrowser {
    pub browser: Browser<SqliteStorage>,
    pub is_new: bool,
}

impl CurrentBrowser {
    /// `Set-Cookie` value for this browser, when one must be sent.
    pub fn cookie(&self, state: &AppState) -> Option<String> {
        self.is_new.then(|| {
            browser_cookie(
                &state.config.auth.cookie_name,
                &self.browser.id,
                state.config.cookie_max_age_secs(),
            )
        })
    }
}

impl FromRequestParts<AppState> for CurrentBrowser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let existing = get_cookie_value(parts, &state.config.auth.cookie_name)
            .filter(|id| is_valid_browser_id(id))
            .map(str::to_string);

        let (id, is_new) = match existing {
            Some(id) => (id, false),
            None => (generate_browser_id(), true),
        };

        Ok(CurrentBrowser {
            browser: Browser::new(id.clone(), SqliteStorage::new(state.db.clone(), id)),
            is_new,
        })
    }
}

pub fn browser_cookie(name: &str, id: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        name, id, max_age_secs
    )
}

fn get_cookie_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let mut split = cookie.splitn(2, '=');
            let key = split.next()?.trim();
            let val = split.next()?.trim();
            if key == name {
                Some(val)
            } else {
                None
            }
        })
}

/// Random 32-byte hex id.
fn generate_browser_id() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn is_valid_browser_id(id: &str) -> bool {
    id.len() == 64 && id.chars().all(|c| c.is_ascii_hexdigit())
}
