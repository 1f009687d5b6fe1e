//! Authentication service for member registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::types::Language;
use shared::validation::{validate_email, validate_member_code, validate_password};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for registering a new cooperative member with owner account
#[derive(Debug, Deserialize)]
pub struct RegisterMemberInput {
    pub member_name: String,
    /// Short code stamped into lot codes (e.g. "OVA")
    pub member_code: String,
    pub owner_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub preferred_language: Option<Language>,
}

/// Input for logging in
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Input for refreshing tokens
#[derive(Debug, Deserialize)]
pub struct RefreshInput {
    pub refresh_token: String,
}

/// Response after successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub member_id: Uuid,
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub member_id: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub member_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub is_active: bool,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Register a new cooperative member with its owner account
    pub async fn register_member(
        &self,
        input: RegisterMemberInput,
    ) -> AppResult<RegisterResponse> {
        if let Err(msg) = validate_member_code(&input.member_code) {
            return Err(AppError::Validation {
                field: "member_code".to_string(),
                message: msg.to_string(),
                message_tr: "Üye kodu 3-10 büyük harf veya rakamdan oluşmalıdır".to_string(),
            });
        }

        if let Err(msg) = validate_email(&input.email) {
            return Err(AppError::Validation {
                field: "email".to_string(),
                message: msg.to_string(),
                message_tr: "Geçersiz e-posta adresi".to_string(),
            });
        }

        if let Err(msg) = validate_password(&input.password) {
            return Err(AppError::Validation {
                field: "password".to_string(),
                message: msg.to_string(),
                message_tr: "Şifre en az 8 karakter olmalıdır".to_string(),
            });
        }

        // Check if member code already exists
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM members WHERE member_code = $1",
        )
        .bind(&input.member_code)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "member".to_string(),
                message: "Member code already exists".to_string(),
                message_tr: "Bu üye kodu zaten kayıtlı".to_string(),
            });
        }

        // Check if email already exists
        let existing_email =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
                .bind(&input.email)
                .fetch_one(&self.db)
                .await?;

        if existing_email > 0 {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        // Hash password
        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let language = input.preferred_language.unwrap_or_default();

        // Start transaction
        let mut tx = self.db.begin().await?;

        let member_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO members (name, member_code, phone, preferred_language)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&input.member_name)
        .bind(&input.member_code)
        .bind(&input.phone)
        .bind(language.code())
        .fetch_one(&mut *tx)
        .await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (member_id, email, password_hash, name)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(member_id)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.owner_name)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let tokens = self.generate_tokens(user_id, member_id)?;

        Ok(RegisterResponse {
            member_id,
            user_id,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        })
    }

    /// Authenticate a user by email and password
    pub async fn login(&self, input: LoginInput) -> AppResult<AuthTokens> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, member_id, email, password_hash, name, is_active
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(&input.email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let valid = verify(&input.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        self.generate_tokens(user.id, user.member_id)
    }

    /// Issue a fresh token pair from a valid refresh token
    pub async fn refresh(&self, input: RefreshInput) -> AppResult<AuthTokens> {
        let claims = self.decode_token(&input.refresh_token)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;
        let member_id = Uuid::parse_str(&claims.member_id).map_err(|_| AppError::InvalidToken)?;

        // The account must still be active
        let is_active =
            sqlx::query_scalar::<_, bool>("SELECT is_active FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or(AppError::InvalidToken)?;

        if !is_active {
            return Err(AppError::InvalidToken);
        }

        self.generate_tokens(user_id, member_id)
    }

    fn generate_tokens(&self, user_id: Uuid, member_id: Uuid) -> AppResult<AuthTokens> {
        let access_token = self.encode_token(user_id, member_id, self.access_token_expiry)?;
        let refresh_token = self.encode_token(user_id, member_id, self.refresh_token_expiry)?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    fn encode_token(&self, user_id: Uuid, member_id: Uuid, expiry: i64) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            member_id: member_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(expiry)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))
    }

    fn decode_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
            _ => AppError::InvalidToken,
        })
    }
}
