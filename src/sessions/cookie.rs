//! Session cookie encoding.
//!
//! Names are URL-encoded and values base64 encoded (URL-safe alphabet, no
//! padding), so both are always valid header text.

use std::time::Duration;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::sessions::SessionError;

const EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

pub fn encode_value(value: &str) -> String {
    URL_SAFE_NO_PAD.encode(value)
}

pub fn decode_value(value: &str) -> Result<String, SessionError> {
    let bytes = URL_SAFE_NO_PAD.decode(value)?;
    String::from_utf8(bytes).map_err(|_| SessionError::InvalidCookie)
}

/// `Set-Cookie` value storing `value` under `name` for `max_age`.
pub fn build(name: &str, value: &str, max_age: Duration) -> Result<HeaderValue, SessionError> {
    let cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        urlencoding::encode(name),
        encode_value(value),
        max_age.as_secs()
    );
    Ok(HeaderValue::from_str(&cookie)?)
}

/// `Set-Cookie` value telling the browser to drop `name`.
pub fn expired(name: &str) -> Result<HeaderValue, SessionError> {
    let cookie = format!(
        "{}=; Path=/; Max-Age=0; Expires={}; HttpOnly; SameSite=Lax",
        urlencoding::encode(name),
        EPOCH
    );
    Ok(HeaderValue::from_str(&cookie)?)
}

/// Decoded value of cookie `name` from the request headers.
///
/// Every `Cookie` header is searched. A value that fails to decode counts
/// as absent.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let wanted = urlencoding::encode(name);
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == wanted)
        .and_then(|(_, value)| decode_value(value.trim_matches('"')).ok())
}

/// A `Set-Cookie` header, usable as a response part.
#[derive(Debug, Clone)]
pub struct SetCookie(pub HeaderValue);

impl IntoResponseParts for SetCookie {
    type Error = std::convert::Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        res.headers_mut().append(SET_COOKIE, self.0);
        Ok(res)
    }
}
