//! One-shot messages carried across a redirect in a signed cookie

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

const FLASH_COOKIE: &str = "inventory_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: Level,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: Level::Success, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: Level::Warning, message: message.into() }
    }
}

/// Cookie signing key derived from the configured secret
pub fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Queue messages for the next rendered page
pub fn push(jar: SignedCookieJar, messages: impl IntoIterator<Item = Flash>) -> SignedCookieJar {
    let mut pending = pending(&jar);
    pending.extend(messages);

    let value = match serde_json::to_string(&pending) {
        Ok(json) => urlencoding::encode(&json).into_owned(),
        Err(e) => {
            tracing::warn!("Could not encode flash messages: {}", e);
            return jar;
        }
    };

    jar.add(
        Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Remove and return the queued messages
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<Flash>) {
    let messages = pending(&jar);
    if messages.is_empty() {
        return (jar, messages);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), messages)
}

fn pending(jar: &SignedCookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| {
            let json = urlencoding::decode(cookie.value()).ok()?;
            serde_json::from_str(&json).ok()
        })
        .unwrap_or_default()
}
