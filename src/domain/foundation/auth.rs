//! Authentication types for the domain layer.
//!
//! The HTTP layer resolves a bearer token into an `AuthenticatedUser` through
//! the `SessionValidator` port. Billing code only ever sees this type.

use super::UserId;
use thiserror::Error;

/// Caller identity carried by a validated access token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedUser {
    /// The user id from the `userId` claim.
    pub id: UserId,

    /// Email from the token claims.
    pub email: String,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }
}

/// Authentication errors that can occur during token validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    /// No bearer token was presented.
    #[error("Access token required")]
    MissingToken,

    /// The token is malformed or its signature does not verify.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// Validator could not run (bad key material, misconfiguration).
    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Returns true if the caller should obtain a fresh token.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::TokenExpired
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_user_keeps_claims() {
        let user = AuthenticatedUser::new(UserId::new("user-1").unwrap(), "a@b.com");
        assert_eq!(user.id.as_str(), "user-1");
        assert_eq!(user.email, "a@b.com");
    }

    #[test]
    fn token_errors_require_reauthentication() {
        assert!(AuthError::MissingToken.requires_reauthentication());
        assert!(AuthError::InvalidToken.requires_reauthentication());
        assert!(AuthError::TokenExpired.requires_reauthentication());
        assert!(!AuthError::service_unavailable("down").requires_reauthentication());
    }

    #[test]
    fn missing_token_message_matches_api_contract() {
        assert_eq!(AuthError::MissingToken.to_string(), "Access token required");
    }
}
