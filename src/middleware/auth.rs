use axum::{extract::FromRequestParts, http::header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::dto::auth::Claims;
use crate::error::{AppError, AppResult};
use crate::models::GROUP_ADMIN;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Caller identity decoded from a Bearer access token. Handlers take this as
/// an argument; nothing reads identity from anywhere else.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub group: String,
    pub role: Option<String>,
}

impl AuthUser {
    pub fn is_staff(&self) -> bool {
        self.group == GROUP_ADMIN
    }
}

pub fn ensure_staff(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_staff() {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn jwt_secret() -> AppResult<String> {
    std::env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))
}

/// Validates signature and expiry; the token type is the caller's problem.
pub fn decode_claims(token: &str, secret: &str) -> AppResult<Claims> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".into()))?;
    Ok(decoded.claims)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let secret = jwt_secret()?;
        let claims = decode_claims(token, &secret)?;

        if claims.token_type != TOKEN_TYPE_ACCESS {
            return Err(AppError::Unauthorized("Access token required".into()));
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".into()))?;

        Ok(AuthUser {
            user_id,
            group: claims.group,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};

    use super::*;
    use crate::models::GROUP_USER;

    const SECRET: &str = "test-secret";

    fn token(token_type: &str, exp_offset: Duration) -> String {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            group: GROUP_USER.to_string(),
            role: Some("BUYER".to_string()),
            token_type: token_type.to_string(),
            exp: (Utc::now() + exp_offset).timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_round_trips() {
        let claims = decode_claims(&token(TOKEN_TYPE_ACCESS, Duration::hours(1)), SECRET).unwrap();
        assert_eq!(claims.group, GROUP_USER);
        assert_eq!(claims.role.as_deref(), Some("BUYER"));
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
    }

    #[test]
    fn expired_token_is_rejected() {
        let err = decode_claims(&token(TOKEN_TYPE_ACCESS, Duration::hours(-2)), SECRET)
            .expect_err("token expired two hours ago");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let err = decode_claims(&token(TOKEN_TYPE_ACCESS, Duration::hours(1)), "other-secret")
            .expect_err("signature does not verify");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn role_claim_may_be_absent() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            group: GROUP_ADMIN.to_string(),
            role: None,
            token_type: TOKEN_TYPE_ACCESS.to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        let encoded = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let decoded = decode_claims(&encoded, SECRET).unwrap();
        assert_eq!(decoded.role, None);
        assert_eq!(decoded.group, GROUP_ADMIN);
    }

    #[test]
    fn staff_gate_matches_group() {
        let staff = AuthUser {
            user_id: Uuid::new_v4(),
            group: GROUP_ADMIN.to_string(),
            role: None,
        };
        let buyer = AuthUser {
            user_id: Uuid::new_v4(),
            group: GROUP_USER.to_string(),
            role: Some("BUYER".to_string()),
        };
        assert!(ensure_staff(&staff).is_ok());
        assert!(matches!(ensure_staff(&buyer), Err(AppError::Forbidden)));
    }
}
