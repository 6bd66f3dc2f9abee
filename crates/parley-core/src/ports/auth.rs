//! Identity provider ports.

use uuid::Uuid;

/// What a verified bearer token says about its holder.
#[derive(Debug, Clone)]
pub struct PrincipalClaims {
    pub principal_id: Uuid,
    pub email: String,
    pub exp: i64,
}

/// Issues and verifies bearer tokens.
pub trait TokenService: Send + Sync {
    fn issue(&self, principal_id: Uuid, email: &str) -> Result<String, AuthError>;

    /// Validate and decode a token.
    fn verify(&self, token: &str) -> Result<PrincipalClaims, AuthError>;

    /// Lifetime of newly issued tokens.
    fn expiration_seconds(&self) -> i64;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,

    #[error("Hashing error: {0}")]
    HashingError(String),
}
