//! Session persistence over string key-value storage.
//!
//! The session lives in two entries, `token` and `user`. Reads fail open to
//! "no session": a missing entry, an empty token, or a profile that does not
//! parse all read back as `None`.

use base64::{Engine as _, engine::general_purpose};
use std::collections::HashMap;
use std::sync::Mutex;
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies, Key};

use crate::{
    error::{AppError, Result},
    models::{session::Session, user::UserProfile},
};

/// The storage key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// The storage key holding the JSON-serialized user profile.
pub const USER_KEY: &str = "user";

/// Durable string storage the session is persisted in.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// Cookie attributes applied to session cookies.
#[derive(Debug, Clone, Copy)]
pub struct CookieSettings {
    /// Lifetime of the cookies in days.
    pub max_age_days: i64,
    /// Whether to mark the cookies `Secure`.
    pub secure: bool,
}

/// Encodes a stored value so that it survives cookie syntax.
pub fn encode_cookie_value(value: &str) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(value.as_bytes())
}

/// Decodes a cookie value written by [`encode_cookie_value`].
pub fn decode_cookie_value(raw: &str) -> Option<String> {
    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(raw).ok()?;
    String::from_utf8(bytes).ok()
}

/// Session storage backed by the browser's cookies.
///
/// Cookies are signed with the server key. A cookie whose signature does not
/// verify reads as absent.
#[derive(Clone)]
pub struct CookieStorage {
    cookies: Cookies,
    key: Key,
    settings: CookieSettings,
}

impl CookieStorage {
    /// Creates a new `CookieStorage` signing with `key`.
    pub fn new(cookies: Cookies, key: Key, settings: CookieSettings) -> Self {
        Self {
            cookies,
            key,
            settings,
        }
    }

    fn build_cookie(&self, name: &str, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(name.to_string(), value);

        if name == TOKEN_KEY {
            cookie.set_http_only(true);
        }

        if self.settings.secure {
            cookie.set_secure(true);
        }

        cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
        cookie.set_max_age(Duration::days(self.settings.max_age_days));
        cookie.set_path("/");

        cookie
    }
}

impl SessionStorage for CookieStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        let signed = self.cookies.signed(&self.key);
        let Some(cookie) = signed.get(key) else {
            if self.cookies.get(key).is_some() {
                tracing::warn!("Cookie {} failed signature verification", key);
            }
            return None;
        };
        let decoded = decode_cookie_value(cookie.value());
        if decoded.is_none() {
            tracing::warn!("Cookie {} is not a valid encoded value", key);
        }
        decoded
    }

    fn set_item(&self, key: &str, value: &str) {
        let cookie = self.build_cookie(key, encode_cookie_value(value));
        self.cookies.signed(&self.key).add(cookie);
    }

    fn remove_item(&self, key: &str) {
        let mut cookie = Cookie::new(key.to_string(), "");
        cookie.set_max_age(Duration::seconds(0));
        cookie.set_path("/");
        self.cookies.signed(&self.key).remove(cookie);
    }
}

/// In-process session storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty `MemoryStorage`.
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items().insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items().remove(key);
    }
}

impl<S: SessionStorage + ?Sized> SessionStorage for &S {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) {
        (**self).remove_item(key)
    }
}

/// Reads and writes the current session.
pub struct SessionStore<S> {
    storage: S,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Creates a new `SessionStore` over `storage`.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns the stored session, or `None` if there is no valid one.
    pub fn get_session(&self) -> Option<Session> {
        let token = self
            .storage
            .get_item(TOKEN_KEY)
            .filter(|token| !token.is_empty())?;

        let Some(user_json) = self.storage.get_item(USER_KEY) else {
            tracing::debug!("Token present without a user profile");
            return None;
        };

        match sonic_rs::from_str::<UserProfile>(&user_json) {
            Ok(user) => Some(Session { token, user }),
            Err(e) => {
                tracing::warn!("Stored user profile is unreadable: {}", e);
                None
            }
        }
    }

    /// Stores a session: the token first, then the profile.
    pub fn set_session(&self, token: &str, user: &UserProfile) -> Result<()> {
        let user_json = sonic_rs::to_string(user)
            .map_err(|e| AppError::Internal(format!("Profile serialization failed: {}", e)))?;

        self.storage.set_item(TOKEN_KEY, token);
        self.storage.set_item(USER_KEY, &user_json);

        tracing::debug!("Session stored for user: {}", user.id);
        Ok(())
    }

    /// Removes both session entries.
    pub fn clear_session(&self) {
        self.storage.remove_item(TOKEN_KEY);
        self.storage.remove_item(USER_KEY);
    }
}
