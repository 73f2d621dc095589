use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    audit,
    db::DbPool,
    dto::auth::{
        AccessTokenResponse, Claims, LoginRequest, RefreshRequest, RegisterRequest,
        TokenPairResponse, UserResponse,
    },
    error::{AppError, AppResult},
    middleware::auth::{TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH, decode_claims, jwt_secret},
    models::{GROUP_ADMIN, GROUP_USER, User},
    response::{ApiResponse, Meta},
};

const ACCESS_TTL_HOURS: i64 = 24;
const REFRESH_TTL_DAYS: i64 = 7;
const MIN_PASSWORD_LEN: usize = 8;

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

fn validate_email(email: &str) -> AppResult<()> {
    let plausible = email
        .split_once('@')
        .map(|(local, domain)| {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        })
        .unwrap_or(false);
    if !plausible {
        return Err(AppError::BadRequest("Invalid email address".into()));
    }
    Ok(())
}

pub async fn register_user(
    pool: &DbPool,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<UserResponse>> {
    let RegisterRequest {
        email,
        password,
        first_name,
        last_name,
    } = payload;

    validate_email(&email)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&password)?;

    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (email, password_hash, first_name, last_name)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(email.as_str())
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .fetch_one(pool)
    .await?;

    audit::record(
        pool,
        user.id,
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("User created", user.into(), None))
}

pub async fn obtain_token_pair(
    pool: &DbPool,
    payload: LoginRequest,
) -> AppResult<ApiResponse<TokenPairResponse>> {
    let LoginRequest { email, password } = payload;
    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await?;

    // A missing account, a wrong password and a deactivated account all read
    // the same from outside.
    let user = match user {
        Some(u) if u.is_active => u,
        _ => return Err(AppError::BadRequest("Invalid email or password".into())),
    };

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;

    if Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_err()
    {
        return Err(AppError::BadRequest("Invalid email or password".into()));
    }

    let secret = jwt_secret()?;
    let pair = issue_token_pair(&user, &secret)?;

    audit::record(
        pool,
        user.id,
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("Logged in", pair, Some(Meta::empty())))
}

pub async fn refresh_access_token(
    pool: &DbPool,
    payload: RefreshRequest,
) -> AppResult<ApiResponse<AccessTokenResponse>> {
    let secret = jwt_secret()?;
    let claims = decode_claims(&payload.refresh, &secret)?;
    if claims.token_type != TOKEN_TYPE_REFRESH {
        return Err(AppError::Unauthorized("Refresh token required".into()));
    }

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".into()))?;

    // Re-read the account so a fresh access token reflects current state.
    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    let user = match user {
        Some(u) if u.is_active => u,
        _ => return Err(AppError::Unauthorized("Invalid refresh token".into())),
    };

    let access = sign(
        &build_claims(&user, TOKEN_TYPE_ACCESS, Duration::hours(ACCESS_TTL_HOURS))?,
        &secret,
    )?;

    Ok(ApiResponse::success(
        "Token refreshed",
        AccessTokenResponse { access },
        None,
    ))
}

pub fn issue_token_pair(user: &User, secret: &str) -> AppResult<TokenPairResponse> {
    let access = sign(
        &build_claims(user, TOKEN_TYPE_ACCESS, Duration::hours(ACCESS_TTL_HOURS))?,
        secret,
    )?;
    let refresh = sign(
        &build_claims(user, TOKEN_TYPE_REFRESH, Duration::days(REFRESH_TTL_DAYS))?,
        secret,
    )?;
    Ok(TokenPairResponse { access, refresh })
}

fn build_claims(user: &User, token_type: &str, ttl: Duration) -> AppResult<Claims> {
    let expiration = Utc::now()
        .checked_add_signed(ttl)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let (group, role) = if user.is_staff {
        (GROUP_ADMIN, None)
    } else {
        (GROUP_USER, Some(user.account_type.clone()))
    };

    Ok(Claims {
        sub: user.id.to_string(),
        group: group.to_string(),
        role,
        token_type: token_type.to_string(),
        exp: expiration.timestamp() as usize,
    })
}

fn sign(claims: &Claims, secret: &str) -> AppResult<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::decode_claims;
    use crate::models::{ACCOUNT_TYPE_BUYER, ACCOUNT_TYPE_SELLER};

    const SECRET: &str = "unit-test-secret";

    fn user(is_staff: bool, account_type: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: "someone@example.com".into(),
            password_hash: String::new(),
            first_name: None,
            last_name: None,
            avatar: None,
            account_type: account_type.into(),
            is_staff,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn buyer_claims_carry_group_and_role() {
        let pair = issue_token_pair(&user(false, ACCOUNT_TYPE_BUYER), SECRET).unwrap();
        let access = decode_claims(&pair.access, SECRET).unwrap();
        assert_eq!(access.group, GROUP_USER);
        assert_eq!(access.role.as_deref(), Some(ACCOUNT_TYPE_BUYER));
        assert_eq!(access.token_type, TOKEN_TYPE_ACCESS);

        let refresh = decode_claims(&pair.refresh, SECRET).unwrap();
        assert_eq!(refresh.token_type, TOKEN_TYPE_REFRESH);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn staff_claims_have_no_role() {
        let pair = issue_token_pair(&user(true, ACCOUNT_TYPE_SELLER), SECRET).unwrap();
        let access = decode_claims(&pair.access, SECRET).unwrap();
        assert_eq!(access.group, GROUP_ADMIN);
        assert_eq!(access.role, None);
    }

    #[test]
    fn password_hashing_round_trips() {
        let hash = hash_password("correct horse battery").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"correct horse battery", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong password", &parsed)
                .is_err()
        );
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(validate_email("a@b").is_ok());
        assert!(validate_email("name@example.com").is_ok());
        assert!(validate_email("missing-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("name@").is_err());
        assert!(validate_email("na me@example.com").is_err());
    }
}
