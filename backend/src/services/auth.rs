//! Authentication service for user registration, login, and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::Role;
use shared::validation::{validate_cpf, validate_email, validate_password, validate_phone};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for public farmer self-registration
#[derive(Debug, Deserialize)]
pub struct RegisterFarmerInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub document: Option<String>,
    pub phone: Option<String>,
}

/// Response after successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub farmer_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub role: String,
    pub farmer_id: Option<String>,
    pub staff_id: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

/// The logged-in user's profile, returned beside the tokens so the client
/// can persist it
#[derive(Debug, Serialize)]
pub struct SessionProfile {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub farmer_id: Option<Uuid>,
    pub staff_id: Option<Uuid>,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login result: profile plus tokens
#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub user: SessionProfile,
    #[serde(flatten)]
    pub tokens: AuthTokens,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    role: String,
    active: bool,
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

    /// Register a new farmer account: creates the user and the linked
    /// farmer profile in one transaction
    pub async fn register_farmer(&self, input: RegisterFarmerInput) -> AppResult<RegisterResponse> {
        validate_email(&input.email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
            message_pt: "E-mail inválido".to_string(),
        })?;
        validate_password(&input.password).map_err(|msg| AppError::Validation {
            field: "password".to_string(),
            message: msg.to_string(),
            message_pt: "A senha deve ter pelo menos 8 caracteres".to_string(),
        })?;
        if let Some(ref document) = input.document {
            validate_cpf(document).map_err(|msg| AppError::Validation {
                field: "document".to_string(),
                message: msg.to_string(),
                message_pt: "CPF inválido".to_string(),
            })?;
        }
        if let Some(ref phone) = input.phone {
            validate_phone(phone).map_err(|msg| AppError::Validation {
                field: "phone".to_string(),
                message: msg.to_string(),
                message_pt: "Telefone inválido".to_string(),
            })?;
        }

        // Check if email already exists
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.db.begin().await?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (email, password_hash, name, role)
            VALUES (LOWER($1), $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.name)
        .bind(Role::Farmer.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let farmer_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO farmers (user_id, name, document, phone)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.document)
        .bind(&input.phone)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let tokens =
            self.generate_tokens(user_id, Role::Farmer, Some(farmer_id), None)?;

        Ok(RegisterResponse {
            user_id,
            farmer_id,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: tokens.token_type,
            expires_in: tokens.expires_in,
        })
    }

    /// Authenticate a credential pair and return the profile plus tokens
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResult> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, name, role, active
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !user.active {
            return Err(AppError::InvalidCredentials);
        }

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;
        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        let role = Role::parse(&user.role)
            .ok_or_else(|| AppError::Internal(format!("Unknown role '{}'", user.role)))?;

        let farmer_id =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM farmers WHERE user_id = $1")
                .bind(user.id)
                .fetch_optional(&self.db)
                .await?;
        let staff_id =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM staff_members WHERE user_id = $1")
                .bind(user.id)
                .fetch_optional(&self.db)
                .await?;

        let tokens = self.generate_tokens(user.id, role, farmer_id, staff_id)?;

        Ok(LoginResult {
            user: SessionProfile {
                user_id: user.id,
                name: user.name,
                email: user.email,
                role,
                farmer_id,
                staff_id,
            },
            tokens,
        })
    }

    /// Exchange a refresh token for a fresh token pair
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let claims = self.decode_token(refresh_token)?;

        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;
        let role = Role::parse(&claims.role).ok_or(AppError::InvalidToken)?;

        // The account must still exist and be active
        let active = sqlx::query_scalar::<_, bool>("SELECT active FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::InvalidToken)?;
        if !active {
            return Err(AppError::InvalidToken);
        }

        let farmer_id = claims.farmer_id.as_deref().and_then(|s| Uuid::parse_str(s).ok());
        let staff_id = claims.staff_id.as_deref().and_then(|s| Uuid::parse_str(s).ok());

        self.generate_tokens(user_id, role, farmer_id, staff_id)
    }

    fn generate_tokens(
        &self,
        user_id: Uuid,
        role: Role,
        farmer_id: Option<Uuid>,
        staff_id: Option<Uuid>,
    ) -> AppResult<AuthTokens> {
        let now = Utc::now();

        let access_claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            farmer_id: farmer_id.map(|id| id.to_string()),
            staff_id: staff_id.map(|id| id.to_string()),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
        };
        let refresh_claims = Claims {
            sub: user_id.to_string(),
            role: role.as_str().to_string(),
            farmer_id: farmer_id.map(|id| id.to_string()),
            staff_id: staff_id.map(|id| id.to_string()),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.refresh_token_expiry)).timestamp(),
        };

        let key = EncodingKey::from_secret(self.jwt_secret.as_bytes());
        let access_token = encode(&Header::default(), &access_claims, &key)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &key)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {}", e)))?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
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
