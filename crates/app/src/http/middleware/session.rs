use axum::body::Body;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, COOKIE, SET_COOKIE};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use crate::state::AppState;

const SESSION_COOKIE_NAME: &str = "pinboard_session";

/// The authenticated caller, injected into request extensions by
/// `require_user`.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: Uuid,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("sessions not configured")]
    MissingConfig,
    #[error("authentication required")]
    MissingToken,
    #[error("session token invalid")]
    InvalidToken,
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: Uuid,
    exp: i64,
}

pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, SessionError> {
    let secret = state
        .config
        .session_secret
        .as_deref()
        .filter(|value| !value.is_empty())
        .ok_or(SessionError::MissingConfig)?;

    let token = extract_bearer_token(&request)
        .or_else(|| extract_cookie(&request, SESSION_COOKIE_NAME))
        .ok_or(SessionError::MissingToken)?;
    let user_id = verify_token(secret, &token).ok_or(SessionError::InvalidToken)?;
    request.extensions_mut().insert(CurrentUser { id: user_id });
    Ok(next.run(request).await)
}

pub fn issue_token(secret: &str, user_id: Uuid, max_age_secs: i64) -> Result<String, SessionError> {
    let exp = Utc::now().timestamp().saturating_add(max_age_secs);
    let claims = SessionClaims { sub: user_id, exp };
    let json = serde_json::to_vec(&claims).map_err(|_| SessionError::InvalidToken)?;
    let claims_b64 = URL_SAFE_NO_PAD.encode(json);
    let signature = sign_token(secret, &claims_b64);
    Ok(format!("{claims_b64}.{signature}"))
}

/// Returns the user id when the token is authentic and unexpired.
pub fn verify_token(secret: &str, token: &str) -> Option<Uuid> {
    let mut iter = token.splitn(2, '.');
    let claims_b64 = match iter.next() {
        Some(value) if !value.is_empty() => value,
        _ => return None,
    };
    let sig = match iter.next() {
        Some(value) if !value.is_empty() => value,
        _ => return None,
    };
    if sig != sign_token(secret, claims_b64) {
        return None;
    }
    let claims = decode_claims(claims_b64)?;
    if claims.exp <= Utc::now().timestamp() {
        return None;
    }
    Some(claims.sub)
}

pub fn build_cookie_value(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}",
        name = SESSION_COOKIE_NAME,
        value = token,
        max_age = max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_cookie_value(secure: bool) -> String {
    build_cookie_value("", 0, secure)
}

pub fn attach_cookie(mut response: Response, cookie_value: String) -> Response {
    if let Ok(value) = cookie_value.parse() {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}

pub fn is_https(headers: &axum::http::HeaderMap) -> bool {
    if let Some(value) = headers.get("x-forwarded-proto") {
        if let Ok(value) = value.to_str() {
            if value
                .split(',')
                .any(|part| part.trim().eq_ignore_ascii_case("https"))
            {
                return true;
            }
        }
    }
    if let Some(value) = headers.get("forwarded") {
        if let Ok(value) = value.to_str() {
            for part in value.split(';') {
                let part = part.trim();
                if let Some(proto) = part.strip_prefix("proto=") {
                    if proto.trim().eq_ignore_ascii_case("https") {
                        return true;
                    }
                }
            }
        }
    }
    false
}

fn decode_claims(claims_b64: &str) -> Option<SessionClaims> {
    let bytes = URL_SAFE_NO_PAD.decode(claims_b64.as_bytes()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

fn sign_token(secret: &str, claims_b64: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("hmac can take key of any size");
    mac.update(claims_b64.as_bytes());
    let raw = mac.finalize().into_bytes();
    URL_SAFE_NO_PAD.encode(raw)
}

fn extract_bearer_token<B>(request: &Request<B>) -> Option<String> {
    let header = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let header = header.trim();
    let value = header.strip_prefix("Bearer ")?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn extract_cookie<B>(request: &Request<B>, name: &str) -> Option<String> {
    let header = request.headers().get(COOKIE)?.to_str().ok()?;
    for part in header.split(';') {
        let trimmed = part.trim();
        let mut iter = trimmed.splitn(2, '=');
        let key = iter.next()?.trim();
        let value = iter.next()?.trim();
        if key == name {
            return Some(value.to_string());
        }
    }
    None
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = match self {
            SessionError::MissingConfig => axum::http::StatusCode::SERVICE_UNAVAILABLE,
            SessionError::MissingToken | SessionError::InvalidToken => {
                axum::http::StatusCode::UNAUTHORIZED
            }
        };
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{build_cookie_value, clear_cookie_value, issue_token, verify_token};

    #[test]
    fn issue_token_round_trip() {
        let secret = "secret";
        let user_id = Uuid::from_u128(42);
        let token = issue_token(secret, user_id, 60).unwrap();
        assert_eq!(verify_token(secret, &token), Some(user_id));
    }

    #[test]
    fn verify_token_rejects_foreign_secret() {
        let token = issue_token("secret-a", Uuid::from_u128(1), 60).unwrap();
        assert_eq!(verify_token("secret-b", &token), None);
    }

    #[test]
    fn verify_token_rejects_expired() {
        let token = issue_token("secret", Uuid::from_u128(1), -10).unwrap();
        assert_eq!(verify_token("secret", &token), None);
    }

    #[test]
    fn build_cookie_is_site_wide_and_http_only() {
        let cookie = build_cookie_value("token", 60, false);
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=60"));
        assert!(!cookie.contains("Secure"));
        assert!(build_cookie_value("token", 60, true).contains("Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert!(clear_cookie_value(false).contains("Max-Age=0"));
    }
}
