use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Argon2,
};
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use stockdash_core::users::{User, UserError, UserRole};

use crate::error::ApiError;
use crate::main_lib::AppState;

/// Hash of a nonsense password, verified against when login hits an unknown
/// email so both failure paths cost one argon2 verification.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0c0kLpTrGMVGKztISuYqqTFs";

pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role: UserRole,
    pub iat: usize,
    pub exp: usize,
}

/// Authenticated user attached to the request by [`require_auth`].
#[derive(Clone)]
pub struct CurrentUser(pub Arc<User>);

impl AuthManager {
    pub fn new(jwt_secret: &[u8], token_ttl: Duration) -> Self {
        let encoding_key = EncodingKey::from_secret(jwt_secret);
        let decoding_key = DecodingKey::from_secret(jwt_secret);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Self {
            encoding_key,
            decoding_key,
            validation,
            token_ttl,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, ApiError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
    }

    pub fn verify_password(&self, candidate: &str, hash: &str) -> Result<(), ApiError> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| ApiError::Internal(format!("Stored password hash is invalid: {e}")))?;
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .map_err(|err| match err {
                PasswordHashError::Password => ApiError::InvalidCredentials,
                other => ApiError::Internal(format!("Password verification failed: {other}")),
            })
    }

    /// Burn one verification without revealing whether the email exists.
    pub fn verify_dummy(&self) -> ApiError {
        let _ = self.verify_password("invalid", DUMMY_HASH);
        ApiError::InvalidCredentials
    }

    pub fn issue_token(&self, user: &User) -> Result<String, ApiError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| ApiError::Internal("System clock is before UNIX_EPOCH".into()))?;
        let exp = now + self.token_ttl;
        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            iat: now.as_secs() as usize,
            exp: exp.as_secs() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign token: {e}")))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_) => ApiError::TokenInvalid,
                other => ApiError::Internal(format!("Failed to validate token: {other:?}")),
            })
    }
}

/// Middleware guarding the authenticated part of the API.
///
/// Validates the bearer token, loads the user it names, rejects inactive
/// accounts, and attaches [`CurrentUser`] for the handlers downstream.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::TokenInvalid)?;

    let mut parts = header.splitn(2, ' ');
    let (Some(scheme), Some(token)) = (parts.next(), parts.next()) else {
        return Err(ApiError::TokenInvalid);
    };

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ApiError::TokenInvalid);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(ApiError::TokenInvalid);
    }

    let claims = state.auth.validate_token(token)?;

    let user = state
        .user_service
        .get_user(&claims.sub)
        .map_err(|_| ApiError::TokenInvalid)?;
    if !user.is_active {
        return Err(ApiError::Core(UserError::Inactive.into()));
    }

    request.extensions_mut().insert(CurrentUser(Arc::new(user)));
    Ok(next.run(request).await)
}

/// Admin gate for management endpoints.
pub fn ensure_admin(user: &User) -> Result<(), ApiError> {
    match user.role {
        UserRole::Admin => Ok(()),
        UserRole::Staff => Err(ApiError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn manager(ttl: Duration) -> AuthManager {
        AuthManager::new(&[42u8; 32], ttl)
    }

    fn user(role: UserRole) -> User {
        User {
            id: "user-1".to_string(),
            email: "a@b.co".to_string(),
            name: "A".to_string(),
            password_hash: String::new(),
            role,
            is_active: true,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn hash_then_verify_round_trip() {
        let auth = manager(Duration::from_secs(60));
        let hash = auth.hash_password("correct horse").unwrap();
        assert!(auth.verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            auth.verify_password("wrong", &hash),
            Err(ApiError::InvalidCredentials)
        ));
    }

    #[test]
    fn issued_token_carries_user_id_and_role() {
        let auth = manager(Duration::from_secs(3600));
        let token = auth.issue_token(&user(UserRole::Admin)).unwrap();
        let claims = auth.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = manager(Duration::from_secs(3600));
        // Craft a token whose exp is beyond the default 60s decode leeway.
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize;
        let claims = Claims {
            sub: "user-1".to_string(),
            role: UserRole::Staff,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&[42u8; 32]),
        )
        .unwrap();
        assert!(matches!(
            auth.validate_token(&token),
            Err(ApiError::TokenExpired)
        ));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let auth = manager(Duration::from_secs(3600));
        let other = AuthManager::new(&[7u8; 32], Duration::from_secs(3600));
        let token = other.issue_token(&user(UserRole::Staff)).unwrap();
        assert!(matches!(
            auth.validate_token(&token),
            Err(ApiError::TokenInvalid)
        ));
        assert!(matches!(
            auth.validate_token("not-a-jwt"),
            Err(ApiError::TokenInvalid)
        ));
    }

    #[test]
    fn dummy_verification_reports_invalid_credentials() {
        let auth = manager(Duration::from_secs(60));
        assert!(matches!(auth.verify_dummy(), ApiError::InvalidCredentials));
    }

    #[test]
    fn staff_is_not_admin() {
        assert!(ensure_admin(&user(UserRole::Admin)).is_ok());
        assert!(matches!(
            ensure_admin(&user(UserRole::Staff)),
            Err(ApiError::Forbidden)
        ));
    }
}
