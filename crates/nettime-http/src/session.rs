//! Authenticated session state.

use reqwest::header::{
    ACCEPT_ENCODING, CONTENT_TYPE, COOKIE, DNT, HeaderMap, HeaderName, HeaderValue,
};

use nettime_core::error::AuthError;
use nettime_core::{AccessToken, Result};

/// Everything obtained by one successful login.
///
/// The token, the headers derived from it and the server settings live and
/// die together: the client holds either a whole `ActiveSession` or none.
pub(crate) struct ActiveSession {
    pub(crate) token: AccessToken,
    pub(crate) headers: HeaderMap,
    pub(crate) settings: serde_json::Value,
    pub(crate) role: Option<String>,
}

impl ActiveSession {
    pub(crate) fn new(token: AccessToken, headers: HeaderMap, settings: serde_json::Value) -> Self {
        let role = settings
            .get("rol")
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned);

        Self {
            token,
            headers,
            settings,
            role,
        }
    }
}

/// Build the request headers for a session token.
///
/// The result depends on nothing but the token: the static fields the web
/// client sends plus the `sessionID` cookie.
///
/// # Errors
///
/// Fails with [`AuthError::MissingToken`] for an empty token and
/// [`AuthError::InvalidToken`] if the token cannot be sent in a header.
pub fn session_headers(token: &AccessToken) -> Result<HeaderMap> {
    if token.is_empty() {
        return Err(AuthError::MissingToken.into());
    }

    let cookie = HeaderValue::from_str(&format!("sessionID={}; i18next=es", token.as_str()))
        .map_err(|_| AuthError::InvalidToken)?;

    let static_fields: [(HeaderName, &'static str); 3] = [
        (DNT, "1"),
        (CONTENT_TYPE, "application/json;charset=UTF-8"),
        (ACCEPT_ENCODING, "gzip,deflate"),
    ];

    let mut headers = HeaderMap::with_capacity(static_fields.len() + 1);
    for (name, value) in static_fields {
        headers.insert(name, HeaderValue::from_static(value));
    }
    headers.insert(COOKIE, cookie);

    Ok(headers)
}
