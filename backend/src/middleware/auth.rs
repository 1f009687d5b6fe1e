//! Authentication middleware
//!
//! Validates the JWT bearer token and resolves the member scope every
//! record query is bound to.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::error::{ErrorDetail, ErrorResponse};
use crate::services::auth::Claims;

/// Authenticated member context extracted from the JWT
#[derive(Clone, Debug)]
pub struct CurrentMember {
    pub user_id: uuid::Uuid,
    pub member_id: uuid::Uuid,
}

/// Authentication middleware that validates JWT tokens.
/// Token validation is done inline to avoid state dependency issues.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    // Get JWT secret from environment (fallback for middleware without state)
    let jwt_secret = std::env::var("OFR__JWT__SECRET")
        .or_else(|_| std::env::var("OFR_JWT_SECRET"))
        .unwrap_or_else(|_| "development-secret-key".to_string());

    let claims = match decode_jwt(token, &jwt_secret) {
        Ok(claims) => claims,
        Err(msg) => {
            return unauthorized_response(&msg);
        }
    };

    let user_id = match uuid::Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid user ID in token"),
    };

    let member_id = match uuid::Uuid::parse_str(&claims.member_id) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid member ID in token"),
    };

    request.extensions_mut().insert(CurrentMember {
        user_id,
        member_id,
    });

    next.run(request).await
}

fn decode_jwt(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token has expired".to_string(),
        _ => "Invalid token".to_string(),
    })
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: ErrorDetail {
                code: "UNAUTHORIZED".to_string(),
                message_en: message.to_string(),
                message_tr: "Oturum doğrulanamadı".to_string(),
                field: None,
            },
        }),
    )
        .into_response()
}
