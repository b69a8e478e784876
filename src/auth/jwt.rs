/// Token issuing and verification
///
/// HS256 only. Verification pins the algorithm and issuer, so tokens signed
/// with another secret, another algorithm or `alg: none` are rejected.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Issue a signed token for `user_id`, valid for `config.token_expiry` seconds.
///
/// # Errors
/// Returns an internal error if signing fails
pub fn issue_token(user_id: &Uuid, config: &JwtSettings) -> Result<String, AppError> {
    let claims = Claims::new(*user_id, config.token_expiry, config.issuer.clone());

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify a token and return its claims.
///
/// # Errors
/// - `AuthError::TokenExpired` once `exp` has passed
/// - `AuthError::TokenInvalid` for bad signatures, foreign algorithms,
///   wrong issuer or malformed payloads
pub fn verify_token(token: &str, config: &JwtSettings) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => {
            tracing::debug!(error = %e, "Token rejected");
            AuthError::TokenInvalid
        }
    })?;

    // jsonwebtoken still accepts `exp == now`; a token is only valid before exp.
    if claims.is_expired() {
        return Err(AuthError::TokenExpired);
    }
    claims.user_id()?;
    claims.token_id()?;
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    fn sign(claims: &Claims, algorithm: Algorithm, secret: &str) -> String {
        encode(
            &Header::new(algorithm),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("Failed to sign claims")
    }

    #[test]
    fn test_issue_and_verify_token() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let token = issue_token(&user_id, &config).expect("Failed to issue token");
        let claims = verify_token(&token, &config).expect("Failed to verify token");

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_two_tokens_for_same_user_differ() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let a = issue_token(&user_id, &config).unwrap();
        let b = issue_token(&user_id, &config).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_token() {
        let config = get_test_config();
        assert_eq!(
            verify_token("invalid.token.here", &config).unwrap_err(),
            AuthError::TokenInvalid
        );
        assert_eq!(verify_token("", &config).unwrap_err(), AuthError::TokenInvalid);
    }

    #[test]
    fn test_expired_token() {
        let config = get_test_config();
        let mut claims = Claims::new(Uuid::new_v4(), 604800, config.issuer.clone());
        // Issued eight days ago, expired one day ago
        claims.iat -= 8 * 24 * 60 * 60;
        claims.exp = claims.iat + 604800;

        let token = sign(&claims, Algorithm::HS256, &config.secret);
        assert_eq!(verify_token(&token, &config).unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn test_token_is_expired_at_exp() {
        let config = get_test_config();
        let claims = Claims::new(Uuid::new_v4(), 0, config.issuer.clone());

        let token = sign(&claims, Algorithm::HS256, &config.secret);
        assert_eq!(verify_token(&token, &config).unwrap_err(), AuthError::TokenExpired);
    }

    #[test]
    fn test_tampered_token() {
        let config = get_test_config();
        let token = issue_token(&Uuid::new_v4(), &config).unwrap();

        // Flip one character in the middle of each of the three segments
        let mut offset = 0;
        for segment in token.split('.') {
            let position = offset + segment.len() / 2;
            let mut bytes = token.clone().into_bytes();
            bytes[position] = if bytes[position] == b'a' { b'Q' } else { b'a' };
            let tampered = String::from_utf8(bytes).unwrap();

            assert_eq!(
                verify_token(&tampered, &config).unwrap_err(),
                AuthError::TokenInvalid,
                "tampered at byte {}",
                position
            );
            offset += segment.len() + 1;
        }

        let appended = format!("{}X", token);
        assert!(verify_token(&appended, &config).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let config = get_test_config();
        let claims = Claims::new(Uuid::new_v4(), 60, config.issuer.clone());
        let token = sign(&claims, Algorithm::HS256, "another-secret-that-is-also-32-bytes-long");

        assert_eq!(verify_token(&token, &config).unwrap_err(), AuthError::TokenInvalid);
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let config = get_test_config();
        let claims = Claims::new(Uuid::new_v4(), 60, config.issuer.clone());
        let token = sign(&claims, Algorithm::HS512, &config.secret);

        assert_eq!(verify_token(&token, &config).unwrap_err(), AuthError::TokenInvalid);
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let config = get_test_config();
        let issued = issue_token(&Uuid::new_v4(), &config).unwrap();
        let payload = issued.split('.').nth(1).unwrap();
        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", payload);

        assert_eq!(verify_token(&unsigned, &config).unwrap_err(), AuthError::TokenInvalid);
    }

    #[test]
    fn test_wrong_issuer() {
        let mut config = get_test_config();
        let token = issue_token(&Uuid::new_v4(), &config).unwrap();

        config.issuer = "wrong-issuer".to_string();
        assert_eq!(verify_token(&token, &config).unwrap_err(), AuthError::TokenInvalid);
    }
}
