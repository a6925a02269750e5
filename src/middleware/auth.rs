use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

use crate::auth;
use crate::gate::Session;

/// Cookie carrying the session token for browser navigation. API clients
/// use `Authorization: Bearer` instead.
pub const SESSION_COOKIE: &str = "session";

/// Decodes the session token (Bearer header first, cookie fallback) and
/// attaches a [`Session`] extension. Never rejects: a missing or invalid
/// token just leaves the request anonymous, and the admin gate decides what
/// that means for gated paths.
pub async fn session_middleware(mut request: Request, next: Next) -> Response {
    if let Some(token) = extract_session_token(request.headers()) {
        match auth::validate_jwt(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(Session {
                    user_id: claims.user_id,
                    email: claims.email,
                });
            }
            Err(e) => {
                tracing::debug!("discarding invalid session token: {}", e);
            }
        }
    }

    next.run(request).await
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers.get("authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                if !token.trim().is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }

    session_cookie(headers)
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get("cookie")?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        headers.insert("cookie", HeaderValue::from_static("session=def"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn falls_back_to_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("theme=dark; session=tok123; lang=en"),
        );
        assert_eq!(extract_session_token(&headers).as_deref(), Some("tok123"));
    }

    #[test]
    fn empty_values_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer "));
        headers.insert("cookie", HeaderValue::from_static("session="));
        assert_eq!(extract_session_token(&headers), None);
    }
}
