use std::{convert::Infallible, fmt, str::FromStr};

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "tabi_session";

/// Identifies one browser's page storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The caller's session, read from the encrypted cookie or freshly minted.
///
/// Handlers must hand `jar` back in their response so a new cookie reaches
/// the browser.
pub struct BrowserSession {
    pub id: SessionId,
    pub jar: PrivateCookieJar,
    pub is_new: bool,
}

impl BrowserSession {
    pub fn open(jar: PrivateCookieJar) -> Self {
        let existing = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| cookie.value().parse::<SessionId>().ok());
        if let Some(id) = existing {
            return Self {
                id,
                jar,
                is_new: false,
            };
        }

        let id = SessionId::generate();
        let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        Self {
            id,
            jar: jar.add(cookie),
            is_new: true,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BrowserSession
where
    S: Send + Sync,
    Key: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = PrivateCookieJar::<Key>::from_request_parts(parts, state).await?;
        Ok(Self::open(jar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reuses_id_from_cookie() {
        let key = Key::generate();
        let first = BrowserSession::open(PrivateCookieJar::new(key.clone()));
        assert!(first.is_new);

        let cookie = first.jar.get(SESSION_COOKIE).expect("session cookie");
        let returning = BrowserSession::open(PrivateCookieJar::new(key).add(cookie));
        assert!(!returning.is_new);
        assert_eq!(returning.id, first.id);
    }
}
