//! Credential and token service: registration, login, token issuance and
//! verification, and the authenticated-user extractor.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::{user, AuthResponse, LoginRequest, MessageResponse, RegisterRequest, Role, User};
use crate::{AppState, DbPool};

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_name, validate_password};

/// Cookie carrying the identity token
pub const AUTH_COOKIE: &str = "accessToken";

/// Identity token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Issue a signed identity token
pub fn issue_token(
    user_id: &str,
    email: &str,
    role: &str,
    secret: &str,
    ttl_days: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        iat: now.timestamp(),
        exp: (now + chrono::Duration::days(ttl_days)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify signature and expiry of an identity token
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// Extract the token from the Authorization header, else the auth cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    CookieJar::from_headers(headers)
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
}

fn build_auth_cookie(token: String, auth: &AuthConfig) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(auth.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(auth.token_ttl_days))
        .build()
}

/// The one error shape for every credential failure, so callers cannot tell
/// a missing account from a wrong password
fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid credentials")
}

fn issue_for(user: &User, auth: &AuthConfig) -> Result<String, ApiError> {
    issue_token(
        &user.id,
        &user.email,
        &user.role,
        &auth.jwt_secret,
        auth.token_ttl_days,
    )
    .map_err(|e| {
        tracing::error!("Failed to sign identity token: {}", e);
        ApiError::internal("Server configuration error")
    })
}

/// Login endpoint
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let user = user::find_by_email(&state.db, &request.email).await?;
    let user = user.ok_or_else(invalid_credentials)?;

    if !verify_password(&request.password, &user.password_hash) {
        return Err(invalid_credentials());
    }

    let token = issue_for(&user, &state.config.auth)?;
    let jar = jar.add(build_auth_cookie(token.clone(), &state.config.auth));

    Ok((jar, Json(AuthResponse::new(&user, token))))
}

fn validate_register_request(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();

    if let Err(e) = validate_name(&req.name) {
        errors.add("name", &e);
    }
    if let Err(e) = validate_email(&req.email) {
        errors.add("email", &e);
    }
    if let Err(e) = validate_password(&req.password) {
        errors.add("password", &e);
    }

    errors.finish()
}

/// Register endpoint: creates the account and logs it in
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    validate_register_request(&request)?;

    if user::find_by_email(&state.db, &request.email)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict(
            "An account with this email already exists",
        ));
    }

    let password_hash = hash_password(&request.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Server error")
    })?;

    let role = request.role.unwrap_or_default();
    let now = chrono::Utc::now().to_rfc3339();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: request.name,
        email: request.email,
        password_hash,
        role: role.as_str().to_string(),
        created_at: now.clone(),
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.role)
    .bind(&user.created_at)
    .bind(&user.updated_at)
    .execute(&state.db)
    .await?;

    tracing::info!("Registered account for {}", user.email);

    let token = issue_for(&user, &state.config.auth)?;
    let jar = jar.add(build_auth_cookie(token.clone(), &state.config.auth));

    Ok((StatusCode::CREATED, jar, Json(AuthResponse::new(&user, token))))
}

/// Logout endpoint: clears the auth cookie
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build((AUTH_COOKIE, "")).path("/").build());
    (jar, Json(MessageResponse::ok("Logged out")))
}

/// Ensure the configured admin account exists (startup bootstrap)
pub async fn ensure_admin_user(db: &DbPool, auth: &AuthConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&auth.admin_email, &auth.admin_password) else {
        return Ok(());
    };

    if user::find_by_email(db, email).await?.is_some() {
        return Ok(());
    }

    let password_hash =
        hash_password(password).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind("Admin")
    .bind(email)
    .bind(&password_hash)
    .bind(Role::Admin.as_str())
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await?;

    tracing::info!("Created admin user {}", email);
    Ok(())
}

/// The authenticated caller, decoded from the request's identity token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers).ok_or_else(invalid_credentials)?;
        let claims = verify_token(&token, &state.config.auth.jwt_secret)
            .map_err(|_| invalid_credentials())?;
        let role = Role::parse(&claims.role).ok_or_else(invalid_credentials)?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            role,
        })
    }
}
