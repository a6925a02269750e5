use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::app::AppState;
use crate::auth::{self, Claims};
use crate::database::models::UserCredentials;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, SESSION_COOKIE};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - verify credentials and issue a session token.
///
/// The token is returned in the body for API clients and set as the session
/// cookie for browser navigation of the admin pages.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let email = payload.email.trim().to_ascii_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user: Option<UserCredentials> =
        sqlx::query_as("SELECT id, email, password_digest FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&state.pool)
            .await?;

    // Same message for unknown email and wrong password
    let user = user.ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;
    if sha256_hex(&payload.password) != user.password_digest {
        tracing::warn!("failed login attempt for {}", email);
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let claims = Claims::new(user.id, user.email.clone());
    let expires_in = claims.exp - claims.iat;
    let token = auth::generate_jwt(claims).map_err(|e| {
        tracing::error!("failed to issue session token: {}", e);
        ApiError::internal_server_error("Failed to issue session token")
    })?;

    tracing::info!("session issued for {}", user.email);

    let body = ApiResponse::success(json!({
        "token": token,
        "user": {
            "id": user.id,
            "email": user.email,
        },
        "expires_in": expires_in,
    }));

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, expires_in
    );
    Ok(with_cookie(body.into_response(), &cookie))
}

/// DELETE /auth/session - stateless logout, clears the session cookie.
pub async fn logout() -> Response {
    let body = ApiResponse::success(json!({ "signed_out": true }));
    let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    with_cookie(body.into_response(), &cookie)
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(e) => tracing::error!("failed to build session cookie header: {}", e),
    }
    response
}

fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_known_vector() {
        // sha256("password")
        assert_eq!(
            sha256_hex("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }
}
