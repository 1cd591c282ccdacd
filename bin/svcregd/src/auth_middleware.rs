//! JWT authentication middleware.
//!
//! Extracts a token from `Authorization: Bearer <token>`, validates it,
//! and provides a [`Caller`] to downstream handlers. Token issuance is
//! the identity provider's job — this binary only validates.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use svcreg_core::Caller;

/// JWT claims payload expected from the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Organization code the user belongs to.
    pub org: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Shared JWT configuration for the middleware.
#[derive(Clone)]
pub struct JwtState {
    pub decoding_key: DecodingKey,
    pub validation: Validation,
}

impl JwtState {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AuthError::MissingToken => {
                (StatusCode::UNAUTHORIZED, "missing authorization token".to_string())
            }
            AuthError::InvalidToken(e) => {
                (StatusCode::UNAUTHORIZED, format!("invalid token: {}", e))
            }
        };
        let body = serde_json::json!({ "code": "UNAUTHENTICATED", "message": msg });
        (status, axum::Json(body)).into_response()
    }
}

/// Middleware that validates the JWT and stores the [`Caller`] in
/// request extensions. Public paths pass through untouched.
pub async fn auth_middleware(
    State(jwt_state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if is_public_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &jwt_state.decoding_key,
        &jwt_state.validation,
    )
    .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    let caller = Caller::new(token_data.claims.sub.clone(), token_data.claims.org.clone());
    request.extensions_mut().insert(token_data.claims);
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}

/// Public endpoints that don't require authentication.
fn is_public_path(path: &str) -> bool {
    matches!(path, "/health" | "/version")
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};

    use super::*;

    #[test]
    fn public_paths() {
        assert!(is_public_path("/health"));
        assert!(is_public_path("/version"));
        assert!(!is_public_path("/catalog/life-situations"));
    }

    #[test]
    fn claims_roundtrip_through_jwt() {
        let now = 1_800_000_000i64;
        let claims = Claims {
            sub: "u-1".into(),
            name: "Alice".into(),
            org: "MIN".into(),
            iat: now,
            exp: now + 3600,
        };
        let secret = "test-secret";
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let state = JwtState::new(secret);
        let mut validation = state.validation.clone();
        // The fixed timestamps above are far in the future; skip the
        // expiry check so the test stays deterministic.
        validation.validate_exp = false;
        let decoded =
            jsonwebtoken::decode::<Claims>(&token, &state.decoding_key, &validation).unwrap();
        assert_eq!(decoded.claims.sub, "u-1");
        assert_eq!(decoded.claims.org, "MIN");
    }
}
