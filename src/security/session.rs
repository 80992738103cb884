//! Editor session tokens and the anonymous site cookie.
//!
//! # Responsibilities
//! - Issue session tokens on login and validate them on every request
//! - Issue the anonymous site cookie for public clients
//! - Slide expiry forward on every successful check
//! - Evict expired tokens on a periodic sweep
//!
//! # Design Decisions
//! - Tokens come from a small fixed pool of server-generated secrets instead
//!   of a fresh secret per login, which bounds the live set; pool size is
//!   configurable
//! - Tokens are opaque strings compared against the live set; there is no
//!   signing or encryption
//! - The site cookie handed to anonymous visitors draws from its own pool
//!   and is never in the live set: only login mints tokens that
//!   `is_valid` accepts

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use uuid::Uuid;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Cookie the session token travels in during local development.
pub const SESSION_COOKIE: &str = "session";
/// Cookie name used when cookies are marked `Secure`.
pub const SECURE_SESSION_COOKIE: &str = "__Secure-Session";
/// Cookie carrying the WebSocket owner id.
pub const WS_SESSION_COOKIE: &str = "WS_SESSION";

/// The session cookie name for the given `Secure` setting.
pub fn session_cookie_name(secure: bool) -> &'static str {
    if secure {
        SECURE_SESSION_COOKIE
    } else {
        SESSION_COOKIE
    }
}

/// In-memory set of valid session tokens with sliding expiry, plus the
/// pool of anonymous site cookies.
pub struct SessionStore {
    secrets: Vec<String>,
    site_secrets: Vec<String>,
    live: Mutex<HashMap<String, u64>>,
    cookie_age: Duration,
}

impl SessionStore {
    pub fn new(pool_size: usize, cookie_age: Duration) -> Self {
        let pool = |_| Uuid::new_v4().to_string();
        Self {
            secrets: (0..pool_size.max(1)).map(pool).collect(),
            site_secrets: (0..pool_size.max(1)).map(pool).collect(),
            live: Mutex::new(HashMap::new()),
            cookie_age,
        }
    }

    pub fn cookie_age(&self) -> Duration {
        self.cookie_age
    }

    /// Issue an editor session on login: pick one of the pool secrets and
    /// mark it live.
    pub fn create(&self) -> String {
        self.create_at(now_ms())
    }

    pub(crate) fn create_at(&self, now: u64) -> String {
        let token = self.secrets[fastrand::usize(..self.secrets.len())].clone();
        let mut live = self.live.lock().expect("session store mutex poisoned");
        live.insert(token.clone(), now + self.cookie_age.as_millis() as u64);
        token
    }

    /// Issue the cookie handed to anonymous public-site visitors. It grants
    /// nothing: site tokens never enter the live set.
    pub fn issue_site(&self) -> String {
        self.site_secrets[fastrand::usize(..self.site_secrets.len())].clone()
    }

    /// True when `token` is one of the site-cookie secrets.
    pub fn is_site(&self, token: &str) -> bool {
        self.site_secrets.iter().any(|s| s == token)
    }

    /// Check a token. A successful check renews the token's expiry.
    pub fn is_valid(&self, token: &str) -> bool {
        self.is_valid_at(token, now_ms())
    }

    pub(crate) fn is_valid_at(&self, token: &str, now: u64) -> bool {
        let mut live = self.live.lock().expect("session store mutex poisoned");
        match live.get_mut(token) {
            Some(expires_at) if *expires_at > now => {
                *expires_at = now + self.cookie_age.as_millis() as u64;
                true
            }
            Some(_) => {
                live.remove(token);
                false
            }
            None => false,
        }
    }

    /// Drop expired tokens.
    pub fn sweep(&self) {
        self.sweep_at(now_ms());
    }

    pub(crate) fn sweep_at(&self, now: u64) {
        let mut live = self.live.lock().expect("session store mutex poisoned");
        live.retain(|_, expires_at| *expires_at > now);
    }
}

/// Pull one cookie's value out of a `Cookie` request header.
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    cookie_header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// Serialize a `Set-Cookie` value for a session token.
pub fn serialize_cookie(name: &str, value: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{name}={value}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
